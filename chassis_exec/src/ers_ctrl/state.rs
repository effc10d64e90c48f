//! Implementations for the ErsCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{ErsCtrlError, Params};
use util::{
    curve::StepTable,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Auto ERS module state
#[derive(Default)]
pub struct ErsCtrl {
    pub(crate) params: Params,

    /// Derived per-mode configurations.
    configs: Vec<ModeConfig>,

    /// Index of the active configuration.
    mode: usize,

    /// The duty cycle phase state.
    osc: DutyCycleOscillator,

    /// True while the ERS may be engaged and must be forced off when the
    /// feature is disabled.
    needs_reset: bool,
}

/// Derived configuration for one ERS mode.
struct ModeConfig {
    on_s: f64,
    off_s: f64,
    step: StepTable,
}

/// Two-phase periodic oscillator gated by an external condition.
///
/// While the gate holds, the oscillator reports whether the current instant
/// falls in the on or off window of its period. Whenever the gate drops the
/// phase is discarded, and the first gated cycle is a no-op boundary so each
/// burst starts with a whole on window.
#[derive(Debug, Default, Clone, Copy)]
pub struct DutyCycleOscillator {
    /// Length of the on window.
    on_s: f64,

    /// Length of the off window.
    off_s: f64,

    /// Time elapsed in the current period.
    elapsed_s: f64,

    /// True once the gate has held since the last off-to-on transition.
    armed: bool,
}

/// The oscillator's position within its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OscPhase {
    /// Not running: gate down, arming boundary, or period wrap.
    Idle,

    /// Inside the on window.
    On,

    /// Inside the off window.
    Off,
}

/// Input data to the auto ERS.
#[derive(Default)]
pub struct InputData {
    /// Whether the feature is enabled this cycle.
    pub enabled: bool,

    /// Time since the previous cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Vehicle speed over ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Whether the ERS is currently engaged.
    pub engaged: bool,
}

/// Output demand from ErsCtrl.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// The new engage state, or `None` if it should not change.
    pub engage: Option<bool>,
}

/// Status report for ErsCtrl processing.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct StatusReport {
    /// Position within the duty period.
    pub phase: OscPhase,

    /// Time elapsed in the current period.
    ///
    /// Units: seconds
    pub elapsed_s: f64,

    /// Whether the speed step table allowed the assist this cycle.
    pub speed_band_open: bool,
}

impl Default for StatusReport {
    fn default() -> Self {
        StatusReport {
            phase: OscPhase::Idle,
            elapsed_s: 0.0,
            speed_band_open: false,
        }
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DutyCycleOscillator {
    /// Create an oscillator with the given window lengths.
    pub fn new(on_s: f64, off_s: f64) -> Self {
        DutyCycleOscillator {
            on_s,
            off_s,
            elapsed_s: 0.0,
            armed: false,
        }
    }

    /// Change the window lengths, keeping the current phase.
    pub fn set_windows(&mut self, on_s: f64, off_s: f64) {
        self.on_s = on_s;
        self.off_s = off_s;
    }

    /// Advance the oscillator by one cycle.
    pub fn advance(&mut self, dt_s: f64, gate: bool) -> OscPhase {
        if !gate {
            self.elapsed_s = 0.0;
            self.armed = false;
            return OscPhase::Idle;
        }

        self.elapsed_s += dt_s;

        // First gated cycle is a no-op boundary
        if !self.armed {
            self.elapsed_s = 0.0;
            self.armed = true;
            return OscPhase::Idle;
        }

        // Wrap by forcing a fresh arm on the next cycle
        if self.elapsed_s > self.on_s + self.off_s {
            self.armed = false;
            return OscPhase::Idle;
        }

        if self.elapsed_s > self.on_s {
            OscPhase::Off
        } else {
            OscPhase::On
        }
    }

    /// Time elapsed in the current period.
    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }
}

impl State for ErsCtrl {
    /// Path to the parameter file and the default mode index.
    type InitData = (&'static str, usize);
    type InitError = ErsCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ErsCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let (param_file, default_mode) = init_data;

        let params: Params = params::load(param_file)?;
        *self = Self::from_params(params, default_mode)?;

        Ok(())
    }

    /// Perform cyclic processing of the auto ERS.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        let cfg = match self.configs.get(self.mode) {
            Some(c) => c,
            None => return Ok((OutputData::default(), report)),
        };

        // Make sure the ERS is off whenever the feature is disabled
        if !input_data.enabled {
            self.osc.advance(input_data.dt_s, false);

            if self.needs_reset {
                self.needs_reset = false;
                return Ok((OutputData { engage: Some(false) }, report));
            }
            return Ok((OutputData::default(), report));
        }

        self.needs_reset = true;

        let phase = self.osc.advance(input_data.dt_s, true);
        report.phase = phase;
        report.elapsed_s = self.osc.elapsed_s();

        let engage = match phase {
            // Boundary and wrap cycles make no actuation decision
            OscPhase::Idle => None,

            OscPhase::Off => {
                if input_data.engaged {
                    Some(false)
                } else {
                    None
                }
            }

            OscPhase::On => {
                let band_open = cfg.step.lookup(input_data.speed_ms);
                report.speed_band_open = band_open;

                if band_open != input_data.engaged {
                    Some(band_open)
                } else {
                    None
                }
            }
        };

        Ok((OutputData { engage }, report))
    }
}

impl ErsCtrl {
    /// Build the module state from already-loaded parameters.
    pub fn from_params(params: Params, default_mode: usize)
        -> Result<Self, ErsCtrlError>
    {
        let mut errors = vec![];

        let num_modes = params.duty_cycles.len();

        for other in [
            params.period_s.len(),
            params.speeds_ms.len(),
            params.enable_states.len(),
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
            return Err(ErsCtrlError::InvalidConfig(errors));
        }

        let mut configs = vec![];

        for mode in 0..num_modes {
            let on_s = params.duty_cycles[mode] * params.period_s[mode];
            let off_s = params.period_s[mode] - on_s;

            match StepTable::new(
                &params.speeds_ms[mode],
                &params.enable_states[mode],
            ) {
                Ok(step) => configs.push(ModeConfig { on_s, off_s, step }),
                Err(e) => errors.push(format!("Mode {}: {}", mode, e)),
            }
        }

        if !errors.is_empty() {
            return Err(ErsCtrlError::InvalidConfig(errors));
        }

        let mode = default_mode.min(num_modes.saturating_sub(1));
        let osc = match configs.get(mode) {
            Some(c) => DutyCycleOscillator::new(c.on_s, c.off_s),
            None => DutyCycleOscillator::default(),
        };

        Ok(ErsCtrl {
            params,
            configs,
            mode,
            osc,
            needs_reset: false,
        })
    }

    /// Number of modes defined by the parameters.
    pub fn num_modes(&self) -> usize {
        self.configs.len()
    }

    /// Swap the active mode configuration, re-deriving the oscillator
    /// windows.
    pub fn select_mode(&mut self, mode: usize) {
        self.mode = mode.min(self.configs.len().saturating_sub(1));

        if let Some(cfg) = self.configs.get(self.mode) {
            self.osc.set_windows(cfg.on_s, cfg.off_s);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_oscillator_duty_windows() {
        // 50% duty over a 1 second period. Cycle time is exactly
        // representable so window edges land exactly on cycle boundaries.
        let mut osc = DutyCycleOscillator::new(0.5, 0.5);
        let dt_s = 0.125;

        // First gated cycle arms without a decision
        assert_eq!(osc.advance(dt_s, true), OscPhase::Idle);

        // Active for elapsed in (0, 0.5], off for (0.5, 1.0], repeating
        for period in 0..3 {
            for i in 0..4 {
                assert_eq!(
                    osc.advance(dt_s, true),
                    OscPhase::On,
                    "period {} on cycle {}",
                    period,
                    i
                );
            }
            for i in 0..4 {
                assert_eq!(
                    osc.advance(dt_s, true),
                    OscPhase::Off,
                    "period {} off cycle {}",
                    period,
                    i
                );
            }

            // Wrap and re-arm boundary
            assert_eq!(osc.advance(dt_s, true), OscPhase::Idle);
            assert_eq!(osc.advance(dt_s, true), OscPhase::Idle);
        }
    }

    #[test]
    fn test_oscillator_gate_drop_resets_phase() {
        let mut osc = DutyCycleOscillator::new(0.5, 0.5);

        osc.advance(0.1, true);
        osc.advance(0.3, true);
        assert_eq!(osc.advance(0.1, true), OscPhase::On);

        // Dropping the gate discards the phase entirely
        assert_eq!(osc.advance(0.1, false), OscPhase::Idle);
        assert_eq!(osc.elapsed_s(), 0.0);

        // And the next gated cycle is an arming boundary again
        assert_eq!(osc.advance(0.1, true), OscPhase::Idle);
        assert_eq!(osc.advance(0.1, true), OscPhase::On);
    }

    fn test_params() -> Params {
        Params {
            duty_cycles: vec![1.0, 0.5],
            period_s: vec![1.0, 1.0],
            speeds_ms: vec![vec![0.0, 20.0], vec![0.0, 26.0]],
            enable_states: vec![vec![true, false], vec![true, false]],
        }
    }

    #[test]
    fn test_engage_follows_speed_band() {
        let mut ctrl = ErsCtrl::from_params(test_params(), 0).unwrap();

        let input = |speed_ms, engaged| InputData {
            enabled: true,
            dt_s: 0.1,
            speed_ms,
            engaged,
        };

        // Arming boundary
        let (out, _) = ctrl.proc(&input(10.0, false)).unwrap();
        assert!(out.engage.is_none());

        // In band and not engaged: engage
        let (out, report) = ctrl.proc(&input(10.0, false)).unwrap();
        assert_eq!(out.engage, Some(true));
        assert!(report.speed_band_open);

        // Above the band while engaged: disengage
        let (out, _) = ctrl.proc(&input(30.0, true)).unwrap();
        assert_eq!(out.engage, Some(false));

        // No redundant commands once the state matches
        let (out, _) = ctrl.proc(&input(30.0, false)).unwrap();
        assert!(out.engage.is_none());
    }

    #[test]
    fn test_disable_forces_off_once() {
        let mut ctrl = ErsCtrl::from_params(test_params(), 0).unwrap();

        let enabled = InputData {
            enabled: true,
            dt_s: 0.1,
            speed_ms: 10.0,
            engaged: false,
        };
        ctrl.proc(&enabled).unwrap();
        ctrl.proc(&enabled).unwrap();

        let disabled = InputData {
            enabled: false,
            dt_s: 0.1,
            speed_ms: 10.0,
            engaged: true,
        };

        let (out, _) = ctrl.proc(&disabled).unwrap();
        assert_eq!(out.engage, Some(false));

        let (out, _) = ctrl.proc(&disabled).unwrap();
        assert!(out.engage.is_none());
    }
}
