//! Implementations for the StabCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::{Params, StabCtrlError, GRAVITY_EPSILON_MS2, ROT_STICK_EPSILON};
use util::{
    module::State,
    params,
    session::Session,
    time::DwellTimer,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Conversion from revolutions/minute to radians/second.
const RPM_TO_RADS: f64 = std::f64::consts::TAU / 60.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Stabilisation module state
#[derive(Default)]
pub struct StabCtrl {
    pub(crate) params: Params,

    /// Threshold on `dot(gravity, up)` above which the vehicle counts as
    /// tipped, derived from the activation angle.
    tipped_threshold: f64,

    /// Recovery roll rate in radians/second.
    recovery_rate_rads: f64,

    /// True while a recovery is in progress.
    recovering: bool,

    /// Dwell before the hold-level override re-engages after steering.
    dwell: DwellTimer,

    /// True while overrides may be asserted and must be released when the
    /// feature is disabled.
    needs_reset: bool,
}

/// Input data to stabilisation.
#[derive(Default)]
pub struct InputData {
    /// Whether the feature is enabled this cycle.
    pub enabled: bool,

    /// True if the driver commanded a manual recovery this cycle.
    pub recovery_requested: bool,

    /// Time since the previous cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Natural gravity vector in the world frame.
    ///
    /// Units: meters/second^2
    pub gravity_ms2: Vector3<f64>,

    /// Vehicle up axis in the world frame.
    pub up: Vector3<f64>,

    /// Vehicle right axis in the world frame.
    pub right: Vector3<f64>,

    /// Lateral stick deflection, -1 to +1.
    pub lat_stick: f64,

    /// Combined magnitude of the rotation stick axes.
    pub rot_stick_mag: f64,

    /// Vehicle speed over ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Elevation above the reference surface.
    ///
    /// Units: meters
    pub elevation_m: f64,

    /// Mean tire friction over all four corners.
    ///
    /// Units: percent
    pub mean_friction_pct: f64,

    /// Calibrated hold-level clearance elevation, `None` until the
    /// calibrator has produced one.
    pub clearance_elev_m: Option<f64>,
}

/// Output demand from StabCtrl.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    pub demand: StabDemand,
}

/// What the stabilizers should be told this cycle.
#[derive(Clone, Copy, PartialEq, Serialize, Debug)]
pub enum StabDemand {
    /// Leave the stabilizers exactly as they are.
    None,

    /// Drop all overrides, the driver (or the hardware's passive damping)
    /// has control.
    Release,

    /// Assert a zero-rate override on every stabilizer to hold the chassis
    /// level.
    HoldLevel,

    /// Assert a constant roll rate, in the vehicle frame, to right the
    /// vehicle.
    Roll {
        /// Units: radians/second, positive rolls right-side-down
        roll_rads: f64,
    },
}

impl Default for StabDemand {
    fn default() -> Self {
        StabDemand::None
    }
}

/// Status report for StabCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Dot product of the gravity and up unit vectors.
    pub gravity_dot_up: f64,

    /// Tilt from upright.
    ///
    /// Units: degrees
    pub tilt_deg: f64,

    /// True while auto-recovery is rolling the vehicle.
    pub recovering: bool,

    /// True while the hold-level override is asserted.
    pub holding: bool,

    /// True if gravity was too weak to stabilise against this cycle.
    pub degenerate_gravity: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for StabCtrl {
    /// Path to the parameter file.
    type InitData = &'static str;
    type InitError = StabCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = StabCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data)?;
        *self = Self::from_params(params);

        Ok(())
    }

    /// Perform cyclic processing of stabilisation.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        // Release everything once when the feature is disabled
        if !input_data.enabled {
            if self.needs_reset {
                self.needs_reset = false;
                self.recovering = false;
                return Ok((
                    OutputData {
                        demand: StabDemand::Release,
                    },
                    report,
                ));
            }
            return Ok((OutputData::default(), report));
        }

        self.needs_reset = true;

        // In free fall there is no up to recover towards
        let gravity_unit = match input_data
            .gravity_ms2
            .try_normalize(GRAVITY_EPSILON_MS2)
        {
            Some(g) => g,
            None => {
                report.degenerate_gravity = true;
                return Ok((OutputData::default(), report));
            }
        };

        if input_data.recovery_requested {
            self.recovering = true;
        }

        // Manual rotation input always wins over stabilisation, but never
        // interrupts a recovery in progress
        if input_data.rot_stick_mag > ROT_STICK_EPSILON && !self.recovering {
            self.dwell.interrupt();
            return Ok((
                OutputData {
                    demand: StabDemand::Release,
                },
                report,
            ));
        }

        let gravity_dot_up = gravity_unit.dot(&input_data.up);
        report.gravity_dot_up = gravity_dot_up;
        report.tilt_deg = 180.0 - gravity_dot_up.acos().to_degrees();

        let tipped = gravity_dot_up > self.tipped_threshold;
        if tipped {
            self.recovering = true;
        }

        if self.recovering {
            // Recovery ends the moment the vehicle is back under the
            // activation angle
            if !tipped {
                self.recovering = false;
                self.dwell.interrupt();
                return Ok((
                    OutputData {
                        demand: StabDemand::Release,
                    },
                    report,
                ));
            }

            report.recovering = true;

            // Roll opposing the side gravity currently pulls down. The
            // command is re-asserted every cycle, a stabilizer whose
            // override has been knocked out must be told again.
            let gravity_dot_right = gravity_unit.dot(&input_data.right);
            let roll_rads = if gravity_dot_right <= 0.0 {
                self.recovery_rate_rads
            } else {
                -self.recovery_rate_rads
            };

            return Ok((
                OutputData {
                    demand: StabDemand::Roll { roll_rads },
                },
                report,
            ));
        }

        // Steady state hold-level stabilisation
        if !self.params.hold_level {
            return Ok((OutputData::default(), report));
        }

        if input_data.lat_stick != 0.0 {
            self.dwell.interrupt();
            return Ok((
                OutputData {
                    demand: StabDemand::Release,
                },
                report,
            ));
        }

        if !self.dwell.accumulate(input_data.dt_s) {
            return Ok((
                OutputData {
                    demand: StabDemand::Release,
                },
                report,
            ));
        }

        // Nothing to hold against until the clearance elevation is known
        let clearance_elev_m = match input_data.clearance_elev_m {
            Some(c) => c,
            None => return Ok((OutputData::default(), report)),
        };

        let hold = input_data.speed_ms > self.params.min_speed_ms
            && input_data.mean_friction_pct > self.params.low_grip_friction_pct
            && input_data.elevation_m >= clearance_elev_m;

        report.holding = hold;

        let demand = if hold {
            StabDemand::HoldLevel
        } else {
            StabDemand::Release
        };

        Ok((OutputData { demand }, report))
    }
}

impl StabCtrl {
    /// Build the module state from already-loaded parameters.
    pub fn from_params(params: Params) -> Self {
        // The activation angle is measured from upright, while the dot
        // product is against the gravity direction, hence the reflection
        // through pi.
        let tipped_threshold =
            (std::f64::consts::PI - params.activation_angle_deg.to_radians())
                .cos();

        StabCtrl {
            tipped_threshold,
            recovery_rate_rads: params.max_rate_rpm * RPM_TO_RADS,
            dwell: DwellTimer::new(params.reengage_dwell_s),
            recovering: false,
            needs_reset: false,
            params,
        }
    }

    /// The explicitly configured clearance elevation, or `None` if it should
    /// be calibrated automatically.
    pub fn configured_clearance_m(&self) -> Option<f64> {
        if self.params.clearance_elev_m > 0.0 {
            Some(self.params.clearance_elev_m)
        } else {
            None
        }
    }

    /// Latch a driver-requested recovery.
    pub fn request_recovery(&mut self) {
        self.recovering = true;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            activation_angle_deg: 80.0,
            max_rate_rpm: 30.0,
            hold_level: true,
            reengage_dwell_s: 0.5,
            min_speed_ms: 10.0,
            low_grip_friction_pct: 10.0,
            clearance_elev_m: 0.0,
        }
    }

    /// Input for a vehicle rolled by `roll_deg` about its forward (z) axis,
    /// gravity straight down.
    fn rolled_input(roll_deg: f64) -> InputData {
        let roll = roll_deg.to_radians();

        InputData {
            enabled: true,
            recovery_requested: false,
            dt_s: 0.02,
            gravity_ms2: Vector3::new(0.0, -9.81, 0.0),
            up: Vector3::new(-roll.sin(), roll.cos(), 0.0),
            right: Vector3::new(roll.cos(), roll.sin(), 0.0),
            lat_stick: 0.0,
            rot_stick_mag: 0.0,
            speed_ms: 20.0,
            elevation_m: 2.0,
            mean_friction_pct: 60.0,
            clearance_elev_m: Some(1.0),
        }
    }

    #[test]
    fn test_recovery_roll_opposes_tilt() {
        let mut ctrl = StabCtrl::from_params(test_params());

        // Rolled 150 degrees to the left the right axis points skyward, so
        // gravity opposes it and the commanded roll is right-side-down
        let (out, report) = ctrl.proc(&rolled_input(150.0)).unwrap();
        assert!(report.recovering);
        match out.demand {
            StabDemand::Roll { roll_rads } => assert!(roll_rads > 0.0),
            d => panic!("expected a roll demand, got {:?}", d),
        }

        // Mirrored tilt commands the mirrored roll
        let mut ctrl = StabCtrl::from_params(test_params());
        let (out, _) = ctrl.proc(&rolled_input(-150.0)).unwrap();
        match out.demand {
            StabDemand::Roll { roll_rads } => assert!(roll_rads < 0.0),
            d => panic!("expected a roll demand, got {:?}", d),
        }
    }

    #[test]
    fn test_recovery_ends_below_activation_angle() {
        let mut ctrl = StabCtrl::from_params(test_params());

        ctrl.proc(&rolled_input(150.0)).unwrap();

        // Back under the activation angle: one release, then steady state
        let (out, report) = ctrl.proc(&rolled_input(10.0)).unwrap();
        assert!(!report.recovering);
        assert_eq!(out.demand, StabDemand::Release);
    }

    #[test]
    fn test_manual_rotation_releases_overrides() {
        let mut ctrl = StabCtrl::from_params(test_params());

        let mut input = rolled_input(150.0);
        input.rot_stick_mag = 0.5;
        ctrl.recovering = false;

        // Driver rotation wins while no recovery is in progress
        let (out, report) = ctrl.proc(&input).unwrap();
        assert_eq!(out.demand, StabDemand::Release);
        assert!(!report.recovering);
    }

    #[test]
    fn test_hold_level_after_dwell() {
        let mut ctrl = StabCtrl::from_params(test_params());

        let input = rolled_input(0.0);

        // Dwell runs first
        let (out, _) = ctrl.proc(&input).unwrap();
        assert_eq!(out.demand, StabDemand::Release);

        for _ in 0..25 {
            ctrl.proc(&input).unwrap();
        }

        let (out, report) = ctrl.proc(&input).unwrap();
        assert!(report.holding);
        assert_eq!(out.demand, StabDemand::HoldLevel);

        // Too slow: released again
        let mut slow = rolled_input(0.0);
        slow.speed_ms = 5.0;
        let (out, _) = ctrl.proc(&slow).unwrap();
        assert_eq!(out.demand, StabDemand::Release);
    }

    #[test]
    fn test_free_fall_skips_stabilisation() {
        let mut ctrl = StabCtrl::from_params(test_params());

        let mut input = rolled_input(150.0);
        input.gravity_ms2 = Vector3::zeros();

        let (out, report) = ctrl.proc(&input).unwrap();
        assert!(report.degenerate_gravity);
        assert_eq!(out.demand, StabDemand::None);
    }

    #[test]
    fn test_requested_recovery_when_upright_ends_immediately() {
        let mut ctrl = StabCtrl::from_params(test_params());

        let mut input = rolled_input(0.0);
        input.recovery_requested = true;

        let (out, report) = ctrl.proc(&input).unwrap();
        assert!(!report.recovering);
        assert_eq!(out.demand, StabDemand::Release);
    }
}
