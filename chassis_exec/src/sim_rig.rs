//! # Simulated vehicle rig
//!
//! An in-memory implementation of every equipment port, standing in for the
//! real vehicle. The dynamics are deliberately crude (first order speed
//! response, flat ground, canned driver inputs), just enough to exercise the
//! control modules end to end without hardware.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::{Rotation3, Vector3};

// Internal
use veh_if::cmd::TireCompound;
use veh_if::eqpt::{
    helm::{Helm, HelmReport},
    power::{ErsPort, ExhaustBank, ServiceCtrl},
    stab::Stabilizer,
    susp::{Corner, SuspensionRig},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Forward acceleration at full throttle.
///
/// Units: meters/second^2
const FULL_THROTTLE_ACCEL_MS2: f64 = 8.0;

/// Speed-proportional drag coefficient.
///
/// Units: 1/second
const DRAG_PER_S: f64 = 0.05;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State of one simulated suspension corner.
#[derive(Debug, Clone, Copy)]
struct CornerState {
    steer_angle_rad: f64,
    height_m: f64,
    strength_pct: f64,
    friction_pct: f64,
    air_shock: bool,
}

/// A simulated stabilizer.
pub struct SimStabilizer {
    attitude: Rotation3<f64>,
    override_on: bool,
    rate_rads: Vector3<f64>,
}

/// The simulated vehicle.
pub struct SimRig {
    corners: [CornerState; 4],

    /// Stabilizers mounted on the vehicle, at assorted orientations.
    pub stabs: Vec<SimStabilizer>,

    // Driver station state
    time_s: f64,
    speed_ms: f64,
    lat_stick: f64,
    fwd_stick: f64,
    handbrake: bool,

    // Powertrain state
    ers_engaged: bool,
    service_enabled: bool,
    exhaust_open: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimStabilizer {
    pub fn new(attitude: Rotation3<f64>) -> Self {
        SimStabilizer {
            attitude,
            override_on: false,
            rate_rads: Vector3::zeros(),
        }
    }

    /// The last commanded rate.
    pub fn rate_rads(&self) -> Vector3<f64> {
        self.rate_rads
    }
}

impl Stabilizer for SimStabilizer {
    fn attitude(&self) -> Rotation3<f64> {
        self.attitude
    }

    fn override_on(&self) -> bool {
        self.override_on
    }

    fn set_override(&mut self, on: bool) {
        self.override_on = on;
    }

    fn set_rate_rads(&mut self, rate_rads: Vector3<f64>) {
        self.rate_rads = rate_rads;
    }
}

impl SimRig {
    pub fn new() -> Self {
        let corner = CornerState {
            steer_angle_rad: 0.0,
            height_m: 0.09,
            strength_pct: 16.0,
            friction_pct: 60.0,
            air_shock: false,
        };

        SimRig {
            corners: [corner; 4],
            stabs: vec![
                SimStabilizer::new(Rotation3::identity()),
                SimStabilizer::new(Rotation3::from_axis_angle(
                    &Vector3::y_axis(),
                    std::f64::consts::FRAC_PI_2,
                )),
            ],
            time_s: 0.0,
            speed_ms: 0.0,
            lat_stick: 0.0,
            fwd_stick: 0.0,
            handbrake: false,
            ers_engaged: false,
            service_enabled: true,
            exhaust_open: false,
        }
    }

    /// Advance the toy dynamics by one cycle.
    ///
    /// The driver profile is canned: full throttle with a one second weave
    /// every eight seconds.
    pub fn step(&mut self, dt_s: f64) {
        self.time_s += dt_s;

        self.fwd_stick = 1.0;
        self.lat_stick = if self.time_s % 8.0 >= 4.0 && self.time_s % 8.0 < 5.0
        {
            1.0
        } else {
            0.0
        };

        let accel_ms2 = if self.handbrake {
            -2.0 * self.speed_ms
        } else {
            self.fwd_stick * FULL_THROTTLE_ACCEL_MS2
                - DRAG_PER_S * self.speed_ms * self.speed_ms.abs()
        };

        self.speed_ms = (self.speed_ms + accel_ms2 * dt_s).max(0.0);
    }
}

impl Default for SimRig {
    fn default() -> Self {
        SimRig::new()
    }
}

impl SuspensionRig for SimRig {
    fn steer_angle_rad(&self, corner: Corner) -> f64 {
        self.corners[corner.index()].steer_angle_rad
    }

    fn set_steer_angle_rad(&mut self, corner: Corner, angle_rad: f64) {
        self.corners[corner.index()].steer_angle_rad = angle_rad;
    }

    fn height_m(&self, corner: Corner) -> f64 {
        self.corners[corner.index()].height_m
    }

    fn set_height_m(&mut self, corner: Corner, height_m: f64) {
        self.corners[corner.index()].height_m = height_m;
    }

    fn strength_pct(&self, corner: Corner) -> f64 {
        self.corners[corner.index()].strength_pct
    }

    fn set_strength_pct(&mut self, corner: Corner, strength_pct: f64) {
        self.corners[corner.index()].strength_pct = strength_pct;
    }

    fn friction_pct(&self, corner: Corner) -> f64 {
        self.corners[corner.index()].friction_pct
    }

    fn set_friction_pct(&mut self, corner: Corner, friction_pct: f64) {
        self.corners[corner.index()].friction_pct = friction_pct;
    }

    fn air_shock_enabled(&self, corner: Corner) -> bool {
        self.corners[corner.index()].air_shock
    }

    fn set_air_shock_enabled(&mut self, corner: Corner, enabled: bool) {
        self.corners[corner.index()].air_shock = enabled;
    }
}

impl Helm for SimRig {
    fn report(&self) -> HelmReport {
        let forward = Vector3::z();

        HelmReport {
            speed_ms: self.speed_ms,
            lat_stick: self.lat_stick,
            fwd_stick: self.fwd_stick,
            rot_stick_mag: 0.0,
            up: Vector3::y(),
            right: Vector3::x(),
            forward,
            gravity_ms2: Vector3::new(0.0, -9.81, 0.0),
            velocity_ms: forward * self.speed_ms,
            elevation_m: 0.4,
            power_frac: self.fwd_stick.abs(),
        }
    }

    fn handbrake(&self) -> bool {
        self.handbrake
    }

    fn set_handbrake(&mut self, on: bool) {
        debug!("Handbrake {}", if on { "set" } else { "released" });
        self.handbrake = on;
    }
}

impl ErsPort for SimRig {
    fn engaged(&self) -> bool {
        self.ers_engaged
    }

    fn set_engaged(&mut self, on: bool) {
        self.ers_engaged = on;
    }
}

impl ServiceCtrl for SimRig {
    fn enabled(&self) -> bool {
        self.service_enabled
    }

    fn set_enabled(&mut self, on: bool) {
        self.service_enabled = on;
    }

    fn request_tire(&mut self, compound: TireCompound) {
        debug!("Service controller fitting {:?} tires", compound);
        self.corners
            .iter_mut()
            .for_each(|c| c.friction_pct = 60.0);
    }
}

impl ExhaustBank for SimRig {
    fn open(&self) -> bool {
        self.exhaust_open
    }

    fn set_open(&mut self, open: bool) {
        self.exhaust_open = open;
    }
}
