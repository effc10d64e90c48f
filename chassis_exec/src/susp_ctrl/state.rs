//! Implementations for the SuspCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Params, SuspCtrlError};
use util::{
    curve::Curve,
    maths::step_toward,
    module::State,
    params,
    session::Session,
    time::DwellTimer,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Active ride height module state
#[derive(Default)]
pub struct SuspCtrl {
    pub(crate) params: Params,

    /// Derived per-mode configurations.
    configs: Vec<ModeConfig>,

    /// Index of the active configuration.
    mode: usize,

    /// Dwell before the return to neutral height begins.
    dwell: DwellTimer,

    /// True while the corners carry scheduled heights which must be reverted
    /// to neutral when the feature is disabled.
    needs_reset: bool,
}

/// Derived configuration for one ride height mode.
struct ModeConfig {
    /// Neutral ride height.
    neutral_m: f64,

    front_inside: Curve,
    front_outside: Curve,
    rear_inside: Curve,
    rear_outside: Curve,
}

/// Input data to active ride height.
#[derive(Default)]
pub struct InputData {
    /// Whether the feature is enabled this cycle.
    pub enabled: bool,

    /// True while another module (air shock) holds the suspension and ride
    /// height control must stand off.
    pub suppressed: bool,

    /// Lateral stick deflection, -1 to +1.
    pub lat_stick: f64,

    /// Vehicle speed over ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Time since the previous cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Current corner heights in FL, FR, RL, RR order.
    ///
    /// Units: meters
    pub heights_m: [f64; 4],
}

/// Output demand from SuspCtrl.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// Corner height demand in FL, FR, RL, RR order, or `None` to leave the
    /// suspension alone.
    pub heights_m: Option<[f64; 4]>,
}

/// Status report for SuspCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True while waiting out the return-to-neutral dwell.
    pub dwelling: bool,

    /// True while cornering heights are being applied.
    pub turning: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for SuspCtrl {
    /// Path to the parameter file and the default mode index.
    type InitData = (&'static str, usize);
    type InitError = SuspCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SuspCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let (param_file, default_mode) = init_data;

        let params: Params = params::load(param_file)?;
        *self = Self::from_params(params, default_mode)?;

        Ok(())
    }

    /// Perform cyclic processing of active ride height.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        let cfg = match self.configs.get(self.mode) {
            Some(c) => c,
            None => return Ok((OutputData::default(), report)),
        };

        // Revert to neutral once when the feature is disabled mid-corner
        if !input_data.enabled && self.needs_reset {
            self.needs_reset = false;
            return Ok((
                OutputData {
                    heights_m: Some([cfg.neutral_m; 4]),
                },
                report,
            ));
        }

        // Stand off while disabled, and while the air shock owns the
        // suspension (without forgetting that a reset is due)
        if !input_data.enabled || input_data.suppressed {
            return Ok((OutputData::default(), report));
        }

        self.needs_reset = true;

        let heights_m;

        if input_data.lat_stick == 0.0 {
            // Straight running: wait out the dwell, then settle each corner
            // onto the neutral height
            if !self.dwell.accumulate(input_data.dt_s) {
                report.dwelling = true;
                return Ok((OutputData::default(), report));
            }

            let mut settled = [0f64; 4];
            for i in 0..4 {
                settled[i] = step_toward(
                    input_data.heights_m[i],
                    cfg.neutral_m,
                    self.params.height_step_m,
                );
            }
            heights_m = settled;
        } else {
            self.dwell.interrupt();
            report.turning = true;

            let front_inside = cfg.front_inside.eval(input_data.speed_ms);
            let front_outside = cfg.front_outside.eval(input_data.speed_ms);
            let rear_inside = cfg.rear_inside.eval(input_data.speed_ms);
            let rear_outside = cfg.rear_outside.eval(input_data.speed_ms);

            // Steering left makes the left corners the inside of the turn
            let left_turn = input_data.lat_stick < 0.0;

            heights_m = [
                if left_turn { front_inside } else { front_outside },
                if left_turn { front_outside } else { front_inside },
                if left_turn { rear_inside } else { rear_outside },
                if left_turn { rear_outside } else { rear_inside },
            ];
        }

        Ok((
            OutputData {
                heights_m: Some(heights_m),
            },
            report,
        ))
    }
}

impl SuspCtrl {
    /// Build the module state from already-loaded parameters.
    pub fn from_params(params: Params, default_mode: usize)
        -> Result<Self, SuspCtrlError>
    {
        let mut errors = vec![];

        let num_modes = params.neutral_heights_m.len();

        for other in [
            params.turn_speeds_ms.len(),
            params.front_inside_heights_m.len(),
            params.front_outside_heights_m.len(),
            params.rear_inside_heights_m.len(),
            params.rear_outside_heights_m.len(),
        ]
        .iter()
        {
            if *other != num_modes {
                errors.push(format!(
                    "Mismatched number of modes across tables ({} vs {})",
                    num_modes, other
                ));
            }
        }

        if !errors.is_empty() {
            return Err(SuspCtrlError::InvalidConfig(errors));
        }

        let mut configs = vec![];

        for mode in 0..num_modes {
            let corners = [
                ("front inside", &params.front_inside_heights_m[mode]),
                ("front outside", &params.front_outside_heights_m[mode]),
                ("rear inside", &params.rear_inside_heights_m[mode]),
                ("rear outside", &params.rear_outside_heights_m[mode]),
            ];

            let mut curves = vec![];
            for (name, heights) in corners.iter() {
                match Curve::ascending(&params.turn_speeds_ms[mode], heights) {
                    Ok(c) => curves.push(c),
                    Err(e) => {
                        errors.push(format!("Mode {} {}: {}", mode, name, e))
                    }
                }
            }

            if curves.len() == 4 {
                let rear_outside = curves.pop().unwrap();
                let rear_inside = curves.pop().unwrap();
                let front_outside = curves.pop().unwrap();
                let front_inside = curves.pop().unwrap();

                configs.push(ModeConfig {
                    neutral_m: params.neutral_heights_m[mode],
                    front_inside,
                    front_outside,
                    rear_inside,
                    rear_outside,
                });
            }
        }

        if !errors.is_empty() {
            return Err(SuspCtrlError::InvalidConfig(errors));
        }

        Ok(SuspCtrl {
            dwell: DwellTimer::new(params.neutral_dwell_s),
            mode: default_mode.min(num_modes.saturating_sub(1)),
            params,
            configs,
            needs_reset: false,
        })
    }

    /// Number of modes defined by the parameters.
    pub fn num_modes(&self) -> usize {
        self.configs.len()
    }

    /// Swap the active mode configuration.
    pub fn select_mode(&mut self, mode: usize) {
        self.mode = mode.min(self.configs.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            height_step_m: 0.01,
            neutral_dwell_s: 0.5,
            neutral_heights_m: vec![0.09, -0.32],
            turn_speeds_ms: vec![vec![0.0], vec![0.0]],
            front_inside_heights_m: vec![vec![0.11], vec![-0.32]],
            front_outside_heights_m: vec![vec![0.12], vec![-0.32]],
            rear_inside_heights_m: vec![vec![0.09], vec![-0.32]],
            rear_outside_heights_m: vec![vec![0.11], vec![-0.32]],
        }
    }

    fn turning_input(lat_stick: f64) -> InputData {
        InputData {
            enabled: true,
            suppressed: false,
            lat_stick,
            speed_ms: 20.0,
            dt_s: 0.02,
            heights_m: [0.09; 4],
        }
    }

    #[test]
    fn test_cornering_assigns_sides() {
        let mut ctrl = SuspCtrl::from_params(test_params(), 0).unwrap();

        // Left turn: left corners inside
        let (out, report) = ctrl.proc(&turning_input(-1.0)).unwrap();
        assert!(report.turning);
        assert_eq!(out.heights_m.unwrap(), [0.11, 0.12, 0.09, 0.11]);

        // Right turn: mirrored
        let (out, _) = ctrl.proc(&turning_input(1.0)).unwrap();
        assert_eq!(out.heights_m.unwrap(), [0.12, 0.11, 0.11, 0.09]);
    }

    #[test]
    fn test_neutral_return_waits_for_dwell_then_ramps() {
        let mut ctrl = SuspCtrl::from_params(test_params(), 0).unwrap();

        // Corner first so there's something to return from
        ctrl.proc(&turning_input(1.0)).unwrap();

        let mut input = turning_input(0.0);
        input.heights_m = [0.12; 4];

        // Dwell holds the height for 0.5 s
        let (out, report) = ctrl.proc(&input).unwrap();
        assert!(report.dwelling);
        assert!(out.heights_m.is_none());

        for _ in 0..25 {
            ctrl.proc(&input).unwrap();
        }

        // Then each corner steps toward neutral by at most height_step_m
        let (out, _) = ctrl.proc(&input).unwrap();
        let heights = out.heights_m.unwrap();
        for h in heights.iter() {
            assert!((h - 0.11).abs() < 1e-9);
        }
    }

    #[test]
    fn test_suppressed_stands_off() {
        let mut ctrl = SuspCtrl::from_params(test_params(), 0).unwrap();

        let mut input = turning_input(1.0);
        input.suppressed = true;

        let (out, _) = ctrl.proc(&input).unwrap();
        assert!(out.heights_m.is_none());
    }

    #[test]
    fn test_disable_reverts_to_neutral_once() {
        let mut ctrl = SuspCtrl::from_params(test_params(), 1).unwrap();

        ctrl.proc(&turning_input(1.0)).unwrap();

        let mut input = turning_input(0.0);
        input.enabled = false;

        let (out, _) = ctrl.proc(&input).unwrap();
        assert_eq!(out.heights_m.unwrap(), [-0.32; 4]);

        let (out, _) = ctrl.proc(&input).unwrap();
        assert!(out.heights_m.is_none());
    }
}
