//! Implementations for the GripCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::{GripCtrlError, Params, VELOCITY_EPSILON_MS};
use util::{
    curve::Curve,
    maths::{clamp, step_toward},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The low-grip band the target friction is clamped into.
const LOW_GRIP_BAND_PCT: (f64, f64) = (0.0, 20.0);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Low grip control module state
#[derive(Default)]
pub struct GripCtrl {
    pub(crate) params: Params,

    /// Drift angle threshold against speed, `None` if the configuration was
    /// invalid.
    threshold_curve: Option<Curve>,

    /// Clamped low-grip target friction.
    target_pct: f64,
}

/// Input data to low grip control.
#[derive(Default)]
pub struct InputData {
    /// Whether the manual override feature is enabled this cycle.
    pub manual_enabled: bool,

    /// Whether the automatic feature is enabled this cycle.
    pub auto_enabled: bool,

    /// Vehicle speed over ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Linear velocity in the world frame.
    ///
    /// Units: meters/second
    pub velocity_ms: Vector3<f64>,

    /// Vehicle forward axis in the world frame.
    pub forward: Vector3<f64>,

    /// Current corner frictions in FL, FR, RL, RR order.
    ///
    /// Units: percent
    pub frictions_pct: [f64; 4],
}

/// Output demand from GripCtrl.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// Corner friction demand in FL, FR, RL, RR order, or `None` to leave
    /// the tires alone.
    pub frictions_pct: Option<[f64; 4]>,

    /// True while the companion service controller must stand off.
    pub suspend_service: bool,
}

/// Status report for GripCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True while friction is being pulled down.
    pub active: bool,

    /// Angle between the velocity and the forward axis.
    ///
    /// Units: degrees
    pub drift_angle_deg: f64,

    /// Drift angle threshold at the current speed.
    ///
    /// Units: degrees
    pub threshold_angle_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for GripCtrl {
    /// Path to the parameter file.
    type InitData = &'static str;
    type InitError = GripCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = GripCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data)?;
        *self = Self::from_params(params)?;

        Ok(())
    }

    /// Perform cyclic processing of low grip control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        // Manual override shadows the automatic mode entirely
        if input_data.manual_enabled {
            report.active = true;

            return Ok((
                OutputData {
                    frictions_pct: Some(
                        self.ramped_frictions(&input_data.frictions_pct),
                    ),
                    suspend_service: true,
                },
                report,
            ));
        }

        if !input_data.auto_enabled {
            return Ok((OutputData::default(), report));
        }

        let curve = match &self.threshold_curve {
            Some(c) => c,
            None => return Ok((OutputData::default(), report)),
        };

        if input_data.speed_ms < self.params.auto_min_speed_ms {
            return Ok((OutputData::default(), report));
        }

        let threshold_deg = curve.eval(input_data.speed_ms);
        report.threshold_angle_deg = threshold_deg;

        let vel_unit = match input_data
            .velocity_ms
            .try_normalize(VELOCITY_EPSILON_MS)
        {
            Some(v) => v,
            None => return Ok((OutputData::default(), report)),
        };

        let vel_dot_forward = vel_unit.dot(&input_data.forward);
        report.drift_angle_deg = vel_dot_forward.acos().to_degrees();

        // Reversing never counts as a drift, and a dot product above the
        // threshold cosine means the slide is still within the angle
        if vel_dot_forward < 0.0
            || vel_dot_forward > threshold_deg.to_radians().cos()
        {
            return Ok((OutputData::default(), report));
        }

        report.active = true;

        Ok((
            OutputData {
                frictions_pct: Some(
                    self.ramped_frictions(&input_data.frictions_pct),
                ),
                suspend_service: true,
            },
            report,
        ))
    }
}

impl GripCtrl {
    /// Build the module state from already-loaded parameters.
    pub fn from_params(params: Params) -> Result<Self, GripCtrlError> {
        let threshold_curve = match Curve::ascending(
            &params.auto_speeds_ms,
            &params.auto_angles_deg,
        ) {
            Ok(c) => Some(c),
            Err(e) => {
                return Err(GripCtrlError::InvalidConfig(vec![format!(
                    "Drift angle threshold: {}",
                    e
                )]))
            }
        };

        let target_pct = clamp(
            &params.low_friction_pct,
            &LOW_GRIP_BAND_PCT.0,
            &LOW_GRIP_BAND_PCT.1,
        );

        Ok(GripCtrl {
            params,
            threshold_curve,
            target_pct,
        })
    }

    /// The low-grip friction target.
    pub fn target_pct(&self) -> f64 {
        self.target_pct
    }

    fn ramped_frictions(&self, current_pct: &[f64; 4]) -> [f64; 4] {
        let mut out = [0f64; 4];
        for i in 0..4 {
            out[i] = step_toward(
                current_pct[i],
                self.target_pct,
                self.params.friction_step_pct,
            );
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            low_friction_pct: 10.0,
            friction_step_pct: 5.0,
            auto_min_speed_ms: 20.0,
            auto_speeds_ms: vec![30.0, 80.0],
            auto_angles_deg: vec![7.0, 12.0],
        }
    }

    /// Input sliding at `drift_deg` off the forward axis at `speed_ms`.
    fn drifting_input(speed_ms: f64, drift_deg: f64) -> InputData {
        let drift = drift_deg.to_radians();

        InputData {
            manual_enabled: false,
            auto_enabled: true,
            speed_ms,
            velocity_ms: Vector3::new(drift.sin(), 0.0, drift.cos())
                * speed_ms,
            forward: Vector3::z(),
            frictions_pct: [60.0; 4],
        }
    }

    #[test]
    fn test_manual_ramps_friction_down() {
        let mut ctrl = GripCtrl::from_params(test_params()).unwrap();

        let mut input = drifting_input(0.0, 0.0);
        input.manual_enabled = true;

        let (out, report) = ctrl.proc(&input).unwrap();
        assert!(report.active);
        assert!(out.suspend_service);
        assert_eq!(out.frictions_pct.unwrap(), [55.0; 4]);
    }

    #[test]
    fn test_auto_engages_past_threshold_angle() {
        let mut ctrl = GripCtrl::from_params(test_params()).unwrap();

        // 10 degrees of drift at 30 m/s is past the 7 degree threshold
        let (out, report) = ctrl.proc(&drifting_input(30.0, 10.0)).unwrap();
        assert!(report.active);
        assert_eq!(out.frictions_pct.unwrap(), [55.0; 4]);

        // The same slide within the threshold does nothing
        let mut ctrl = GripCtrl::from_params(test_params()).unwrap();
        let (out, report) = ctrl.proc(&drifting_input(30.0, 5.0)).unwrap();
        assert!(!report.active);
        assert!(out.frictions_pct.is_none());
        assert!(!out.suspend_service);
    }

    #[test]
    fn test_auto_stands_off_below_minimum_speed() {
        let mut ctrl = GripCtrl::from_params(test_params()).unwrap();

        let (out, report) = ctrl.proc(&drifting_input(10.0, 45.0)).unwrap();
        assert!(!report.active);
        assert!(out.frictions_pct.is_none());
    }

    #[test]
    fn test_reversing_is_not_a_drift() {
        let mut ctrl = GripCtrl::from_params(test_params()).unwrap();

        let mut input = drifting_input(30.0, 0.0);
        input.velocity_ms = Vector3::new(0.0, 0.0, -30.0);

        let (out, _) = ctrl.proc(&input).unwrap();
        assert!(out.frictions_pct.is_none());
    }

    #[test]
    fn test_low_target_is_clamped_into_band() {
        let mut params = test_params();
        params.low_friction_pct = 35.0;

        let ctrl = GripCtrl::from_params(params).unwrap();
        assert_eq!(ctrl.target_pct(), 20.0);
    }
}
