//! # Pit manoeuvre module
//!
//! A tire compound command received below the pit entry speed starts the
//! manoeuvre: the suspension is swapped to the pit mode, the handbrake is
//! held until the vehicle has stopped, the tire order goes to the service
//! controller, and the previous suspension mode is recalled.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::{Deserialize, Serialize};

// Internal
use util::{
    module::State,
    params,
    session::Session,
};
use veh_if::cmd::{ModeAction, TireCompound};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Speeds below this count as stopped for servicing.
pub const STOPPED_SPEED_MS: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the pit manoeuvre.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// The ride height mode used while being serviced.
    pub pit_suspension_mode: usize,

    /// Tire commands above this speed are ignored.
    ///
    /// Units: meters/second
    pub max_entry_speed_ms: f64,
}

/// Pit manoeuvre module state
#[derive(Default)]
pub struct PitCtrl {
    pub(crate) params: Params,

    /// The compound being changed onto, while a manoeuvre is in progress.
    pending: Option<TireCompound>,

    /// True once the suspension has been swapped to the pit mode.
    pit_mode_set: bool,
}

/// Input data to the pit manoeuvre.
#[derive(Default)]
pub struct InputData {
    /// Whether the feature is enabled this cycle.
    pub enabled: bool,

    /// Vehicle speed over ground.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// A tire compound commanded this cycle, if any.
    pub tire_request: Option<TireCompound>,
}

/// Output demand from PitCtrl.
#[derive(Clone, Copy, Default, Debug)]
pub struct OutputData {
    /// A mode action to apply to the ride height feature.
    pub susp_mode_action: Option<ModeAction>,

    /// Hold the handbrake.
    pub handbrake: Option<bool>,

    /// Order a tire change from the service controller.
    pub tire_order: Option<TireCompound>,

    /// True while the service controller must stand off (rolling into the
    /// box under handbrake).
    pub suspend_service: bool,
}

/// Status report for PitCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True while a manoeuvre is in progress.
    pub maneuver_active: bool,

    /// True while waiting for the vehicle to stop.
    pub awaiting_stop: bool,
}

/// Possible errors that can occur during PitCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum PitCtrlError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] params::LoadError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for PitCtrl {
    /// Path to the parameter file.
    type InitData = &'static str;
    type InitError = PitCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = PitCtrlError;

    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)?;
        self.pending = None;
        self.pit_mode_set = false;

        Ok(())
    }

    /// Perform cyclic processing of the pit manoeuvre.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let mut report = StatusReport::default();

        if !input_data.enabled {
            return Ok((OutputData::default(), report));
        }

        // Accept a new order only when slow enough to be heading for the
        // box, and only one at a time
        if let Some(compound) = input_data.tire_request {
            if self.pending.is_none()
                && input_data.speed_ms <= self.params.max_entry_speed_ms
            {
                info!("Pit manoeuvre started, changing onto {:?}", compound);
                self.pending = Some(compound);
            } else {
                debug!("Tire request {:?} ignored", compound);
            }
        }

        if self.pending.is_none() {
            return Ok((OutputData::default(), report));
        }

        report.maneuver_active = true;

        // First cycle of the manoeuvre: swap onto the pit suspension mode
        if !self.pit_mode_set {
            self.pit_mode_set = true;
            return Ok((
                OutputData {
                    susp_mode_action: Some(ModeAction::Set(
                        self.params.pit_suspension_mode as i64,
                    )),
                    ..Default::default()
                },
                report,
            ));
        }

        // Hold the handbrake until stopped
        if input_data.speed_ms > STOPPED_SPEED_MS {
            report.awaiting_stop = true;
            return Ok((
                OutputData {
                    handbrake: Some(true),
                    suspend_service: true,
                    ..Default::default()
                },
                report,
            ));
        }

        // Stopped in the box: order the tires and put everything back
        info!("Servicing, tire order: {:?}", self.pending);

        let tire_order = self.pending.take();
        self.pit_mode_set = false;

        Ok((
            OutputData {
                susp_mode_action: Some(ModeAction::RecallPrevious),
                tire_order,
                ..Default::default()
            },
            report,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pit_ctrl() -> PitCtrl {
        PitCtrl {
            params: Params {
                pit_suspension_mode: 1,
                max_entry_speed_ms: 25.0,
            },
            pending: None,
            pit_mode_set: false,
        }
    }

    fn input(speed_ms: f64, tire_request: Option<TireCompound>) -> InputData {
        InputData {
            enabled: true,
            speed_ms,
            tire_request,
        }
    }

    #[test]
    fn test_full_maneuver_sequence() {
        let mut ctrl = pit_ctrl();

        // Order accepted below the entry speed, suspension swaps to pit mode
        let (out, report) = ctrl
            .proc(&input(20.0, Some(TireCompound::Soft)))
            .unwrap();
        assert!(report.maneuver_active);
        assert_eq!(out.susp_mode_action, Some(ModeAction::Set(1)));

        // Still rolling: handbrake held, service suspended
        let (out, report) = ctrl.proc(&input(5.0, None)).unwrap();
        assert!(report.awaiting_stop);
        assert_eq!(out.handbrake, Some(true));
        assert!(out.suspend_service);

        // Stopped: tires ordered, previous mode recalled
        let (out, _) = ctrl.proc(&input(0.2, None)).unwrap();
        assert_eq!(out.tire_order, Some(TireCompound::Soft));
        assert_eq!(out.susp_mode_action, Some(ModeAction::RecallPrevious));

        // And the manoeuvre is over
        let (out, report) = ctrl.proc(&input(0.2, None)).unwrap();
        assert!(!report.maneuver_active);
        assert!(out.tire_order.is_none());
    }

    #[test]
    fn test_fast_tire_request_is_ignored() {
        let mut ctrl = pit_ctrl();

        let (out, report) = ctrl
            .proc(&input(40.0, Some(TireCompound::Wet)))
            .unwrap();
        assert!(!report.maneuver_active);
        assert!(out.susp_mode_action.is_none());
    }
}
