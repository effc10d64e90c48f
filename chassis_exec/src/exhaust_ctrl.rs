//! # Exhaust flap module
//!
//! Opens the exhaust flap bank only while the powertrain is working hard at
//! speed, keeping the flaps shut in the pit lane and under braking.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::{
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the exhaust flaps.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Fraction of maximum power output above which the flaps open.
    pub power_frac_threshold: f64,

    /// Minimum speed for the flaps to open.
    ///
    /// Units: meters/second
    pub min_speed_ms: f64,
}

/// Exhaust flap module state
#[derive(Default)]
pub struct ExhaustCtrl {
    pub(crate) params: Params,
}

/// Input data to the exhaust flaps.
#[derive(Default)]
pub struct InputData {
    /// Whether the feature is enabled this cycle.
    pub enabled: bool,

    /// Fraction of maximum power output currently produced, 0 to 1.
    pub power_frac: f64,

    /// Vehicle speed over ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Whether the flaps are currently open.
    pub open: bool,
}

/// Output demand from ExhaustCtrl.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// The new flap state, or `None` if it should not change.
    pub open: Option<bool>,
}

/// Status report for ExhaustCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True while the flaps are commanded open.
    pub open: bool,
}

/// Possible errors that can occur during ExhaustCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ExhaustCtrlError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] params::LoadError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ExhaustCtrl {
    /// Path to the parameter file.
    type InitData = &'static str;
    type InitError = ExhaustCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ExhaustCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)?;

        Ok(())
    }

    /// Perform cyclic processing of the exhaust flaps.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        if !input_data.enabled {
            return Ok((OutputData::default(), report));
        }

        let want_open = input_data.power_frac
            > self.params.power_frac_threshold
            && input_data.speed_ms > self.params.min_speed_ms;

        report.open = want_open;

        let open = if want_open != input_data.open {
            Some(want_open)
        } else {
            None
        };

        Ok((OutputData { open }, report))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_flaps_need_power_and_speed() {
        let mut ctrl = ExhaustCtrl {
            params: Params {
                power_frac_threshold: 0.45,
                min_speed_ms: 60.0,
            },
        };

        let input = |power_frac, speed_ms, open| InputData {
            enabled: true,
            power_frac,
            speed_ms,
            open,
        };

        // Hard on the power at speed: open
        let (out, _) = ctrl.proc(&input(0.8, 70.0, false)).unwrap();
        assert_eq!(out.open, Some(true));

        // Already open: no redundant command
        let (out, _) = ctrl.proc(&input(0.8, 70.0, true)).unwrap();
        assert!(out.open.is_none());

        // Fast but coasting: shut
        let (out, _) = ctrl.proc(&input(0.1, 70.0, true)).unwrap();
        assert_eq!(out.open, Some(false));

        // Working hard but slow: shut
        let (out, _) = ctrl.proc(&input(0.8, 20.0, true)).unwrap();
        assert_eq!(out.open, Some(false));
    }
}
