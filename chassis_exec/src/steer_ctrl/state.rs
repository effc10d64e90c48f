//! Implementations for the SteerCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Params, SteerCtrlError};
use util::{
    curve::Curve,
    maths::clamp,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Active steering module state
#[derive(Default)]
pub struct SteerCtrl {
    pub(crate) params: Params,

    /// Derived per-mode configurations, rebuilt only at init. Mode changes
    /// swap which entry is active.
    configs: Vec<ModeConfig>,

    /// Index of the active configuration.
    mode: usize,

    /// True while the wheels carry a scheduled angle which must be reverted
    /// to the mode's base angle when the feature is disabled.
    needs_reset: bool,
}

/// Derived configuration for one steering mode.
struct ModeConfig {
    /// Speed to front axle angle curve.
    front: Curve,

    /// Speed to rear axle angle curve.
    rear: Curve,

    /// Friction correction curves, `None` if the mode's adjustment tables
    /// are all zero.
    adjust: Option<AdjustCurves>,
}

/// The friction-indexed correction overlay for one mode.
struct AdjustCurves {
    front: Curve,
    rear: Curve,
}

/// Input data to active steering.
#[derive(Default)]
pub struct InputData {
    /// Whether the feature is enabled this cycle.
    pub enabled: bool,

    /// Vehicle speed over ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Mean tire friction over all four corners.
    ///
    /// Units: percent
    pub mean_friction_pct: f64,
}

/// Output demand from SteerCtrl.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// The angle demand, or `None` if the wheels should be left alone.
    pub demand: Option<SteerDemand>,
}

/// Axle angle demand.
///
/// Units are degrees here, conversion to radians happens at the actuator
/// boundary.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct SteerDemand {
    pub front_angle_deg: f64,
    pub rear_angle_deg: f64,
}

/// Status report for SteerCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the friction correction overlay contributed this cycle.
    pub adjustment_active: bool,

    /// Front correction applied this cycle.
    ///
    /// Units: degrees
    pub front_adj_deg: f64,

    /// Rear correction applied this cycle.
    ///
    /// Units: degrees
    pub rear_adj_deg: f64,

    /// True if either axle demand hit the steering envelope.
    pub angle_clamped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for SteerCtrl {
    /// Path to the parameter file and the default mode index.
    type InitData = (&'static str, usize);
    type InitError = SteerCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SteerCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let (param_file, default_mode) = init_data;

        let params: Params = params::load(param_file)?;
        *self = Self::from_params(params, default_mode)?;

        Ok(())
    }

    /// Perform cyclic processing of active steering.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        // A module with no valid configuration is never evaluated
        let cfg = match self.configs.get(self.mode) {
            Some(c) => c,
            None => return Ok((OutputData::default(), report)),
        };

        // If the feature was just disabled revert the wheels to the mode's
        // base angle once, then leave them alone.
        if !input_data.enabled {
            if self.needs_reset {
                self.needs_reset = false;
                return Ok((
                    OutputData {
                        demand: Some(SteerDemand {
                            front_angle_deg: cfg.front.first(),
                            rear_angle_deg: cfg.rear.first(),
                        }),
                    },
                    report,
                ));
            }
            return Ok((OutputData::default(), report));
        }

        self.needs_reset = true;

        let mut front_deg = cfg.front.eval(input_data.speed_ms);
        let mut rear_deg = cfg.rear.eval(input_data.speed_ms);

        if let Some(adjust) = &cfg.adjust {
            let front_adj = adjust.front.eval(input_data.mean_friction_pct);
            let rear_adj = adjust.rear.eval(input_data.mean_friction_pct);

            front_deg += front_adj;
            rear_deg += rear_adj;

            report.adjustment_active = true;
            report.front_adj_deg = front_adj;
            report.rear_adj_deg = rear_adj;
        }

        let front_lim_deg = clamp(
            &front_deg,
            &self.params.min_angle_deg,
            &self.params.max_angle_deg,
        );
        let rear_lim_deg = clamp(
            &rear_deg,
            &self.params.min_angle_deg,
            &self.params.max_angle_deg,
        );

        if front_lim_deg != front_deg || rear_lim_deg != rear_deg {
            report.angle_clamped = true;
        }

        Ok((
            OutputData {
                demand: Some(SteerDemand {
                    front_angle_deg: front_lim_deg,
                    rear_angle_deg: rear_lim_deg,
                }),
            },
            report,
        ))
    }
}

impl SteerCtrl {
    /// Build the module state from already-loaded parameters.
    ///
    /// All modes are validated and their curves derived up front so that mode
    /// changes are a pure index swap.
    pub fn from_params(params: Params, default_mode: usize)
        -> Result<Self, SteerCtrlError>
    {
        let mut errors = vec![];

        let num_modes = params.front_speeds_ms.len();

        for other in [
            params.front_angles_deg.len(),
            params.rear_speeds_ms.len(),
            params.rear_angles_deg.len(),
            params.adj_frictions_pct.len(),
            params.front_adj_deg.len(),
            params.rear_adj_deg.len(),
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
            return Err(SteerCtrlError::InvalidConfig(errors));
        }

        let mut configs = vec![];

        for mode in 0..num_modes {
            let front = Curve::ascending(
                &params.front_speeds_ms[mode],
                &params.front_angles_deg[mode],
            );
            let rear = Curve::ascending(
                &params.rear_speeds_ms[mode],
                &params.rear_angles_deg[mode],
            );

            // The overlay only exists for modes with a non-zero table
            let adjust_wanted = params.adj_frictions_pct[mode]
                .iter()
                .chain(params.front_adj_deg[mode].iter())
                .chain(params.rear_adj_deg[mode].iter())
                .any(|v| *v != 0.0);

            let adjust = if adjust_wanted {
                let adj_front = Curve::descending(
                    &params.adj_frictions_pct[mode],
                    &params.front_adj_deg[mode],
                );
                let adj_rear = Curve::descending(
                    &params.adj_frictions_pct[mode],
                    &params.rear_adj_deg[mode],
                );

                match (adj_front, adj_rear) {
                    (Ok(f), Ok(r)) => Some(AdjustCurves { front: f, rear: r }),
                    (f, r) => {
                        for err in f.err().iter().chain(r.err().iter()) {
                            errors.push(format!(
                                "Mode {} friction adjustment: {}",
                                mode, err
                            ));
                        }
                        None
                    }
                }
            } else {
                None
            };

            match (front, rear) {
                (Ok(f), Ok(r)) => configs.push(ModeConfig {
                    front: f,
                    rear: r,
                    adjust,
                }),
                (f, r) => {
                    for err in f.err().iter().chain(r.err().iter()) {
                        errors.push(format!("Mode {}: {}", mode, err));
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(SteerCtrlError::InvalidConfig(errors));
        }

        Ok(SteerCtrl {
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
            front_speeds_ms: vec![vec![10.0, 30.0], vec![10.0, 40.0]],
            front_angles_deg: vec![vec![44.0, 33.0], vec![44.0, 36.0]],
            rear_speeds_ms: vec![vec![10.0, 30.0], vec![10.0, 40.0]],
            rear_angles_deg: vec![vec![18.0, 0.0], vec![18.0, 2.0]],
            adj_frictions_pct: vec![vec![60.0, 30.0], vec![0.0]],
            front_adj_deg: vec![vec![0.0, -2.0], vec![0.0]],
            rear_adj_deg: vec![vec![0.0, -2.0], vec![0.0]],
            min_angle_deg: 0.0,
            max_angle_deg: 46.0,
        }
    }

    #[test]
    fn test_speed_scheduling() {
        let mut ctrl = SteerCtrl::from_params(test_params(), 0).unwrap();

        let (out, report) = ctrl
            .proc(&InputData {
                enabled: true,
                speed_ms: 20.0,
                mean_friction_pct: 60.0,
            })
            .unwrap();

        let demand = out.demand.unwrap();
        assert_eq!(demand.front_angle_deg, 38.5);
        assert_eq!(demand.rear_angle_deg, 9.0);
        assert!(report.adjustment_active);
        assert_eq!(report.front_adj_deg, 0.0);
    }

    #[test]
    fn test_friction_adjustment_lowers_angles() {
        let mut ctrl = SteerCtrl::from_params(test_params(), 0).unwrap();

        let (out, report) = ctrl
            .proc(&InputData {
                enabled: true,
                speed_ms: 20.0,
                mean_friction_pct: 30.0,
            })
            .unwrap();

        assert_eq!(report.front_adj_deg, -2.0);
        assert_eq!(out.demand.unwrap().front_angle_deg, 36.5);
    }

    #[test]
    fn test_all_zero_adjustment_is_disabled() {
        let mut ctrl = SteerCtrl::from_params(test_params(), 1).unwrap();

        let (_, report) = ctrl
            .proc(&InputData {
                enabled: true,
                speed_ms: 20.0,
                mean_friction_pct: 30.0,
            })
            .unwrap();

        assert!(!report.adjustment_active);
    }

    #[test]
    fn test_disable_reverts_once() {
        let mut ctrl = SteerCtrl::from_params(test_params(), 0).unwrap();

        let enabled = InputData {
            enabled: true,
            speed_ms: 20.0,
            mean_friction_pct: 60.0,
        };
        ctrl.proc(&enabled).unwrap();

        let disabled = InputData {
            enabled: false,
            ..Default::default()
        };

        // First disabled cycle reverts to the base angle
        let (out, _) = ctrl.proc(&disabled).unwrap();
        let demand = out.demand.unwrap();
        assert_eq!(demand.front_angle_deg, 44.0);
        assert_eq!(demand.rear_angle_deg, 18.0);

        // Later disabled cycles leave the wheels alone
        let (out, _) = ctrl.proc(&disabled).unwrap();
        assert!(out.demand.is_none());
    }

    #[test]
    fn test_mode_count_mismatch_is_rejected() {
        let mut params = test_params();
        params.rear_speeds_ms.pop();

        assert!(matches!(
            SteerCtrl::from_params(params, 0),
            Err(SteerCtrlError::InvalidConfig(_))
        ));
    }
}
