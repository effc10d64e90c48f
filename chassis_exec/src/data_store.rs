//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use crate::{
    air_shock, elev_cal, ers_ctrl, exhaust_ctrl, features::FeatureSet,
    grip_ctrl, pit_ctrl, stab_ctrl, steer_ctrl, strength_ctrl, susp_ctrl,
};
use veh_if::cmd::{FeatureId, TireCompound};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time
    pub elapsed_time_s: f64,

    // Feature registry
    pub features: FeatureSet,

    /// Configuration problems found at startup. Features whose modules
    /// failed validation are disabled and listed here.
    pub config_errors: Vec<String>,

    // Per-cycle command side effects
    /// A manual recovery was commanded this cycle
    pub recovery_requested: bool,

    /// A tire compound was commanded this cycle
    pub tire_request: Option<TireCompound>,

    // Calibrated clearance elevations
    pub stab_clearance_m: Option<f64>,
    pub shock_clearance_m: Option<f64>,

    // SteerCtrl
    pub steer_ctrl: steer_ctrl::SteerCtrl,
    pub steer_ctrl_input: steer_ctrl::InputData,
    pub steer_ctrl_output: steer_ctrl::OutputData,
    pub steer_ctrl_status_rpt: steer_ctrl::StatusReport,

    // SuspCtrl
    pub susp_ctrl: susp_ctrl::SuspCtrl,
    pub susp_ctrl_input: susp_ctrl::InputData,
    pub susp_ctrl_output: susp_ctrl::OutputData,
    pub susp_ctrl_status_rpt: susp_ctrl::StatusReport,

    // StrengthCtrl
    pub strength_ctrl: strength_ctrl::StrengthCtrl,
    pub strength_ctrl_input: strength_ctrl::InputData,
    pub strength_ctrl_output: strength_ctrl::OutputData,
    pub strength_ctrl_status_rpt: strength_ctrl::StatusReport,

    // ErsCtrl
    pub ers_ctrl: ers_ctrl::ErsCtrl,
    pub ers_ctrl_input: ers_ctrl::InputData,
    pub ers_ctrl_output: ers_ctrl::OutputData,
    pub ers_ctrl_status_rpt: ers_ctrl::StatusReport,

    // StabCtrl
    pub stab_ctrl: stab_ctrl::StabCtrl,
    pub stab_ctrl_input: stab_ctrl::InputData,
    pub stab_ctrl_output: stab_ctrl::OutputData,
    pub stab_ctrl_status_rpt: stab_ctrl::StatusReport,

    // GripCtrl
    pub grip_ctrl: grip_ctrl::GripCtrl,
    pub grip_ctrl_input: grip_ctrl::InputData,
    pub grip_ctrl_output: grip_ctrl::OutputData,
    pub grip_ctrl_status_rpt: grip_ctrl::StatusReport,

    // AirShock
    pub air_shock: air_shock::AirShock,
    pub air_shock_input: air_shock::InputData,
    pub air_shock_output: air_shock::OutputData,
    pub air_shock_status_rpt: air_shock::StatusReport,

    // ElevCal
    pub elev_cal: elev_cal::ElevCal,
    pub elev_cal_input: elev_cal::InputData,
    pub elev_cal_output: elev_cal::OutputData,
    pub elev_cal_status_rpt: elev_cal::StatusReport,

    // PitCtrl
    pub pit_ctrl: pit_ctrl::PitCtrl,
    pub pit_ctrl_input: pit_ctrl::InputData,
    pub pit_ctrl_output: pit_ctrl::OutputData,
    pub pit_ctrl_status_rpt: pit_ctrl::StatusReport,

    // ExhaustCtrl
    pub exhaust_ctrl: exhaust_ctrl::ExhaustCtrl,
    pub exhaust_ctrl_input: exhaust_ctrl::InputData,
    pub exhaust_ctrl_output: exhaust_ctrl::OutputData,
    pub exhaust_ctrl_status_rpt: exhaust_ctrl::StatusReport,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and
    /// sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle =
            self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.recovery_requested = false;
        self.tire_request = None;

        self.steer_ctrl_input = Default::default();
        self.steer_ctrl_output = Default::default();
        self.steer_ctrl_status_rpt = Default::default();

        self.susp_ctrl_input = Default::default();
        self.susp_ctrl_output = Default::default();
        self.susp_ctrl_status_rpt = Default::default();

        self.strength_ctrl_input = Default::default();
        self.strength_ctrl_output = Default::default();
        self.strength_ctrl_status_rpt = Default::default();

        self.ers_ctrl_input = Default::default();
        self.ers_ctrl_output = Default::default();
        self.ers_ctrl_status_rpt = Default::default();

        self.stab_ctrl_input = Default::default();
        self.stab_ctrl_output = Default::default();
        self.stab_ctrl_status_rpt = Default::default();

        self.grip_ctrl_input = Default::default();
        self.grip_ctrl_output = Default::default();
        self.grip_ctrl_status_rpt = Default::default();

        self.air_shock_input = Default::default();
        self.air_shock_output = Default::default();
        self.air_shock_status_rpt = Default::default();

        self.elev_cal_input = Default::default();
        self.elev_cal_output = Default::default();
        self.elev_cal_status_rpt = Default::default();

        self.pit_ctrl_input = Default::default();
        self.pit_ctrl_output = Default::default();
        self.pit_ctrl_status_rpt = Default::default();

        self.exhaust_ctrl_input = Default::default();
        self.exhaust_ctrl_output = Default::default();
        self.exhaust_ctrl_status_rpt = Default::default();

        self.elapsed_time_s = util::session::get_elapsed_seconds();
    }

    /// Re-derive a feature's mode-dependent configuration after a mode
    /// change.
    ///
    /// This must complete before the same cycle's control outputs are
    /// computed, which holds because all commands are processed ahead of the
    /// module processing step.
    pub fn rederive(&mut self, feature: FeatureId) {
        let mode = self.features.get(feature).current();

        match feature {
            FeatureId::Steering => self.steer_ctrl.select_mode(mode),
            FeatureId::RideHeight => self.susp_ctrl.select_mode(mode),
            FeatureId::SpringStrength => self.strength_ctrl.select_mode(mode),
            FeatureId::Ers => self.ers_ctrl.select_mode(mode),

            // The remaining features have no mode-derived configuration
            FeatureId::Grip
            | FeatureId::AutoGrip
            | FeatureId::Stab
            | FeatureId::AirShock
            | FeatureId::Panel
            | FeatureId::Pit
            | FeatureId::Exhaust => (),
        }
    }

    /// Record a configuration failure: the feature is disabled until its
    /// parameters are corrected and the message joins the startup report.
    pub fn config_failure(&mut self, feature: FeatureId, message: String) {
        warn!("{:?} configuration invalid: {}", feature, message);

        self.features.get_mut(feature).disable();
        self.config_errors.push(message);
    }
}
