//! Implementations for the AirShock state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::{AirShockError, Params};
use crate::stab_ctrl::GRAVITY_EPSILON_MS2;
use util::{
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Air shock module state
#[derive(Default)]
pub struct AirShock {
    pub(crate) params: Params,

    /// True while a fall is in progress and the dampers should be armed.
    active: bool,

    /// Corner heights recorded while on the ground, restored on landing.
    ///
    /// Units: meters
    stored_heights_m: [f64; 4],
}

/// Input data to the air shock.
#[derive(Default)]
pub struct InputData {
    /// Whether the feature is enabled this cycle.
    pub enabled: bool,

    /// Natural gravity vector in the world frame.
    ///
    /// Units: meters/second^2
    pub gravity_ms2: Vector3<f64>,

    /// Linear velocity in the world frame.
    ///
    /// Units: meters/second
    pub velocity_ms: Vector3<f64>,

    /// Elevation above the reference surface.
    ///
    /// Units: meters
    pub elevation_m: f64,

    /// Calibrated clearance elevation, `None` until the calibrator has
    /// produced one.
    pub clearance_elev_m: Option<f64>,

    /// Current corner heights in FL, FR, RL, RR order.
    ///
    /// Units: meters
    pub heights_m: [f64; 4],

    /// Whether the dampers are currently armed (sensed on one corner, all
    /// four are switched together).
    pub shocks_armed: bool,
}

/// Output demand from AirShock.
#[derive(Clone, Copy, Serialize, Debug)]
pub enum OutputData {
    /// Leave the suspension alone.
    None,

    /// Arm the dampers on all corners and drop to the stowed height.
    Engage {
        /// Units: meters
        stow_height_m: f64,
    },

    /// Disarm the dampers and restore the recorded heights.
    Restore {
        /// Units: meters
        heights_m: [f64; 4],
    },
}

impl Default for OutputData {
    fn default() -> Self {
        OutputData::None
    }
}

/// Status report for AirShock processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True while a fall is in progress.
    pub active: bool,

    /// Vertical speed, positive upward.
    ///
    /// Units: meters/second
    pub vertical_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for AirShock {
    /// Path to the parameter file.
    type InitData = &'static str;
    type InitError = AirShockError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = AirShockError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data)?;
        *self = Self::from_params(params);

        Ok(())
    }

    /// Perform cyclic processing of the air shock.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        if !input_data.enabled {
            return Ok((OutputData::None, report));
        }

        // Vertical speed is the velocity component opposing gravity
        let vertical_speed_ms = match input_data
            .gravity_ms2
            .try_normalize(GRAVITY_EPSILON_MS2)
        {
            Some(g) => -g.dot(&input_data.velocity_ms),
            None => return Ok((OutputData::None, report)),
        };
        report.vertical_speed_ms = vertical_speed_ms;

        let falling =
            vertical_speed_ms <= -self.params.descent_speed_ms.abs();

        if !falling {
            self.active = false;
        }

        if let Some(clearance_elev_m) = input_data.clearance_elev_m {
            if falling && input_data.elevation_m >= clearance_elev_m {
                self.active = true;
            }

            if self.active && !input_data.shocks_armed {
                report.active = true;
                return Ok((
                    OutputData::Engage {
                        stow_height_m: self.params.stow_height_m,
                    },
                    report,
                ));
            }
        }

        if self.active {
            report.active = true;
            return Ok((OutputData::None, report));
        }

        if input_data.shocks_armed {
            return Ok((
                OutputData::Restore {
                    heights_m: self.stored_heights_m,
                },
                report,
            ));
        }

        // On the ground with the dampers disarmed: keep the restore heights
        // fresh
        self.stored_heights_m = input_data.heights_m;

        Ok((OutputData::None, report))
    }
}

impl AirShock {
    /// Build the module state from already-loaded parameters.
    pub fn from_params(params: Params) -> Self {
        AirShock {
            params,
            active: false,
            stored_heights_m: [0.0; 4],
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

    /// True while a fall is in progress. Ride height control stands off
    /// while this holds.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            descent_speed_ms: 5.0,
            stow_height_m: -0.32,
            clearance_elev_m: 0.0,
        }
    }

    fn falling_input(vertical_speed_ms: f64, elevation_m: f64) -> InputData {
        InputData {
            enabled: true,
            gravity_ms2: Vector3::new(0.0, -9.81, 0.0),
            velocity_ms: Vector3::new(0.0, vertical_speed_ms, 0.0),
            elevation_m,
            clearance_elev_m: Some(2.0),
            heights_m: [0.09; 4],
            shocks_armed: false,
        }
    }

    #[test]
    fn test_fast_fall_above_clearance_engages() {
        let mut shock = AirShock::from_params(test_params());

        let (out, report) = shock.proc(&falling_input(-6.0, 5.0)).unwrap();
        assert!(report.active);
        assert!(matches!(out, OutputData::Engage { .. }));
        assert!(shock.is_active());
    }

    #[test]
    fn test_slow_descent_stays_passive() {
        let mut shock = AirShock::from_params(test_params());

        let (out, report) = shock.proc(&falling_input(-2.0, 5.0)).unwrap();
        assert!(!report.active);
        assert!(matches!(out, OutputData::None));
    }

    #[test]
    fn test_landing_restores_recorded_heights() {
        let mut shock = AirShock::from_params(test_params());

        // Record ground heights, then fall and land
        let mut grounded = falling_input(0.0, 0.5);
        grounded.heights_m = [0.11; 4];
        shock.proc(&grounded).unwrap();

        let mut fall = falling_input(-8.0, 5.0);
        shock.proc(&fall).unwrap();

        fall.shocks_armed = true;
        shock.proc(&fall).unwrap();

        // Touchdown: no longer falling, dampers still armed
        let mut landed = falling_input(0.0, 0.2);
        landed.shocks_armed = true;

        let (out, _) = shock.proc(&landed).unwrap();
        match out {
            OutputData::Restore { heights_m } => {
                assert_eq!(heights_m, [0.11; 4])
            }
            o => panic!("expected a restore demand, got {:?}", o),
        }
    }

    #[test]
    fn test_uncalibrated_clearance_never_engages() {
        let mut shock = AirShock::from_params(test_params());

        let mut input = falling_input(-8.0, 5.0);
        input.clearance_elev_m = None;

        let (out, _) = shock.proc(&input).unwrap();
        assert!(matches!(out, OutputData::None));
        assert!(!shock.is_active());
    }
}
