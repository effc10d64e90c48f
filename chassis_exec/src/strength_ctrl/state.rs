//! Implementations for the StrengthCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Params, StrengthCtrlError};
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

/// Active spring strength module state
#[derive(Default)]
pub struct StrengthCtrl {
    pub(crate) params: Params,

    /// Derived per-mode configurations.
    configs: Vec<ModeConfig>,

    /// Index of the active configuration.
    mode: usize,

    /// Dwell before the return to the neutral schedule begins.
    dwell: DwellTimer,

    /// True while the corners carry scheduled strengths which must be
    /// reverted when the feature is disabled.
    needs_reset: bool,
}

/// Derived configuration for one strength mode.
struct ModeConfig {
    neutral: Curve,
    front_inside: Curve,
    front_outside: Curve,
    rear_inside: Curve,
    rear_outside: Curve,
}

/// Input data to active spring strength.
#[derive(Default)]
pub struct InputData {
    /// Whether the feature is enabled this cycle.
    pub enabled: bool,

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

    /// Current corner strengths in FL, FR, RL, RR order.
    ///
    /// Units: percent
    pub strengths_pct: [f64; 4],
}

/// Output demand from StrengthCtrl.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// Corner strength demand in FL, FR, RL, RR order, or `None` to leave
    /// the springs alone.
    pub strengths_pct: Option<[f64; 4]>,
}

/// Status report for StrengthCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True while waiting out the return-to-neutral dwell.
    pub dwelling: bool,

    /// True while cornering strengths are being applied.
    pub turning: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for StrengthCtrl {
    /// Path to the parameter file and the default mode index.
    type InitData = (&'static str, usize);
    type InitError = StrengthCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = StrengthCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let (param_file, default_mode) = init_data;

        let params: Params = params::load(param_file)?;
        *self = Self::from_params(params, default_mode)?;

        Ok(())
    }

    /// Perform cyclic processing of active spring strength.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        let cfg = match self.configs.get(self.mode) {
            Some(c) => c,
            None => return Ok((OutputData::default(), report)),
        };

        // Revert to the base neutral strength once when disabled
        if !input_data.enabled {
            if self.needs_reset {
                self.needs_reset = false;
                return Ok((
                    OutputData {
                        strengths_pct: Some([cfg.neutral.first(); 4]),
                    },
                    report,
                ));
            }
            return Ok((OutputData::default(), report));
        }

        self.needs_reset = true;

        let targets_pct;

        if input_data.lat_stick == 0.0 {
            if !self.dwell.accumulate(input_data.dt_s) {
                report.dwelling = true;
                return Ok((OutputData::default(), report));
            }

            targets_pct = [cfg.neutral.eval(input_data.speed_ms); 4];
        } else {
            self.dwell.interrupt();
            report.turning = true;

            let front_inside = cfg.front_inside.eval(input_data.speed_ms);
            let front_outside = cfg.front_outside.eval(input_data.speed_ms);
            let rear_inside = cfg.rear_inside.eval(input_data.speed_ms);
            let rear_outside = cfg.rear_outside.eval(input_data.speed_ms);

            let left_turn = input_data.lat_stick < 0.0;

            targets_pct = [
                if left_turn { front_inside } else { front_outside },
                if left_turn { front_outside } else { front_inside },
                if left_turn { rear_inside } else { rear_outside },
                if left_turn { rear_outside } else { rear_inside },
            ];
        }

        // Strength always approaches its target gradually
        let mut strengths_pct = [0f64; 4];
        for i in 0..4 {
            strengths_pct[i] = step_toward(
                input_data.strengths_pct[i],
                targets_pct[i],
                self.params.strength_step_pct,
            );
        }

        Ok((
            OutputData {
                strengths_pct: Some(strengths_pct),
            },
            report,
        ))
    }
}

impl StrengthCtrl {
    /// Build the module state from already-loaded parameters.
    pub fn from_params(params: Params, default_mode: usize)
        -> Result<Self, StrengthCtrlError>
    {
        let mut errors = vec![];

        let num_modes = params.speeds_ms.len();

        for other in [
            params.neutral_pct.len(),
            params.front_inside_pct.len(),
            params.front_outside_pct.len(),
            params.rear_inside_pct.len(),
            params.rear_outside_pct.len(),
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
            return Err(StrengthCtrlError::InvalidConfig(errors));
        }

        let mut configs = vec![];

        for mode in 0..num_modes {
            let tables = [
                ("neutral", &params.neutral_pct[mode]),
                ("front inside", &params.front_inside_pct[mode]),
                ("front outside", &params.front_outside_pct[mode]),
                ("rear inside", &params.rear_inside_pct[mode]),
                ("rear outside", &params.rear_outside_pct[mode]),
            ];

            let mut curves = vec![];
            for (name, strengths) in tables.iter() {
                match Curve::ascending(&params.speeds_ms[mode], strengths) {
                    Ok(c) => curves.push(c),
                    Err(e) => {
                        errors.push(format!("Mode {} {}: {}", mode, name, e))
                    }
                }
            }

            if curves.len() == 5 {
                let rear_outside = curves.pop().unwrap();
                let rear_inside = curves.pop().unwrap();
                let front_outside = curves.pop().unwrap();
                let front_inside = curves.pop().unwrap();
                let neutral = curves.pop().unwrap();

                configs.push(ModeConfig {
                    neutral,
                    front_inside,
                    front_outside,
                    rear_inside,
                    rear_outside,
                });
            }
        }

        if !errors.is_empty() {
            return Err(StrengthCtrlError::InvalidConfig(errors));
        }

        Ok(StrengthCtrl {
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
            strength_step_pct: 0.3,
            neutral_dwell_s: 0.0,
            speeds_ms: vec![vec![0.0]],
            neutral_pct: vec![vec![16.0]],
            front_inside_pct: vec![vec![11.0]],
            front_outside_pct: vec![vec![11.0]],
            rear_inside_pct: vec![vec![11.0]],
            rear_outside_pct: vec![vec![16.0]],
        }
    }

    #[test]
    fn test_cornering_strength_is_ramped() {
        let mut ctrl = StrengthCtrl::from_params(test_params(), 0).unwrap();

        let (out, report) = ctrl
            .proc(&InputData {
                enabled: true,
                lat_stick: 1.0,
                speed_ms: 30.0,
                dt_s: 0.02,
                strengths_pct: [16.0; 4],
            })
            .unwrap();

        assert!(report.turning);

        // Targets are [out, in, out, in] = [11, 11, 16, 11] for a right
        // turn, but each write is limited to one step
        assert_eq!(out.strengths_pct.unwrap(), [15.7, 15.7, 16.0, 15.7]);
    }

    #[test]
    fn test_neutral_strength_follows_speed_curve() {
        let mut ctrl = StrengthCtrl::from_params(test_params(), 0).unwrap();

        let (out, _) = ctrl
            .proc(&InputData {
                enabled: true,
                lat_stick: 0.0,
                speed_ms: 50.0,
                dt_s: 0.02,
                strengths_pct: [15.9; 4],
            })
            .unwrap();

        // Single point curve, neutral target is 16 everywhere
        assert_eq!(out.strengths_pct.unwrap(), [16.0; 4]);
    }
}
