//! # Telemetry snapshot
//!
//! A structured snapshot of every feature's enable/mode state and every
//! module's last computed intermediates. The snapshot is serialisable and
//! handed to the session save thread, rendering it for a display is an
//! external concern. The panel feature's mode selects which screen an
//! external renderer should show.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::{
    air_shock, data_store::DataStore, ers_ctrl, exhaust_ctrl, grip_ctrl,
    pit_ctrl, stab_ctrl, steer_ctrl, strength_ctrl, susp_ctrl,
};
use veh_if::cmd::FeatureId;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Telemetry for a single feature's registry state.
#[derive(Clone, Serialize, Debug)]
pub struct FeatureTm {
    pub name: &'static str,
    pub enabled: bool,
    pub mode: usize,
    pub max_mode: usize,
}

/// One cycle's telemetry snapshot.
#[derive(Clone, Serialize, Debug)]
pub struct TmSnapshot {
    /// Session elapsed time at snapshot.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Cycles executed so far.
    pub num_cycles: u128,

    /// Which panel screen an external renderer should show.
    pub panel_screen: usize,

    /// Number of configuration problems found at startup.
    pub num_config_errors: usize,

    /// Registry state of every feature.
    pub features: Vec<FeatureTm>,

    // Last outputs and intermediates of each module
    pub steer: steer_ctrl::OutputData,
    pub steer_rpt: steer_ctrl::StatusReport,

    pub susp: susp_ctrl::OutputData,
    pub susp_rpt: susp_ctrl::StatusReport,

    pub strength: strength_ctrl::OutputData,
    pub strength_rpt: strength_ctrl::StatusReport,

    pub ers: ers_ctrl::OutputData,
    pub ers_rpt: ers_ctrl::StatusReport,

    pub stab: stab_ctrl::OutputData,
    pub stab_rpt: stab_ctrl::StatusReport,

    pub grip: grip_ctrl::OutputData,
    pub grip_rpt: grip_ctrl::StatusReport,

    pub air_shock: air_shock::OutputData,
    pub air_shock_rpt: air_shock::StatusReport,

    pub pit_rpt: pit_ctrl::StatusReport,

    pub exhaust: exhaust_ctrl::OutputData,
    pub exhaust_rpt: exhaust_ctrl::StatusReport,

    /// Calibrated clearance elevations, once known.
    ///
    /// Units: meters
    pub stab_clearance_m: Option<f64>,
    pub shock_clearance_m: Option<f64>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the telemetry snapshot for this cycle.
pub fn snapshot(ds: &DataStore) -> TmSnapshot {
    let features = ds
        .features
        .iter()
        .map(|(_, f)| FeatureTm {
            name: f.name(),
            enabled: f.enabled(),
            mode: f.current(),
            max_mode: f.max(),
        })
        .collect();

    TmSnapshot {
        time_s: ds.elapsed_time_s,
        num_cycles: ds.num_cycles,
        panel_screen: ds.features.get(FeatureId::Panel).current(),
        num_config_errors: ds.config_errors.len(),
        features,
        steer: ds.steer_ctrl_output,
        steer_rpt: ds.steer_ctrl_status_rpt,
        susp: ds.susp_ctrl_output,
        susp_rpt: ds.susp_ctrl_status_rpt,
        strength: ds.strength_ctrl_output,
        strength_rpt: ds.strength_ctrl_status_rpt,
        ers: ds.ers_ctrl_output,
        ers_rpt: ds.ers_ctrl_status_rpt,
        stab: ds.stab_ctrl_output,
        stab_rpt: ds.stab_ctrl_status_rpt,
        grip: ds.grip_ctrl_output,
        grip_rpt: ds.grip_ctrl_status_rpt,
        air_shock: ds.air_shock_output,
        air_shock_rpt: ds.air_shock_status_rpt,
        pit_rpt: ds.pit_ctrl_status_rpt,
        exhaust: ds.exhaust_ctrl_output,
        exhaust_rpt: ds.exhaust_ctrl_status_rpt,
        stab_clearance_m: ds.stab_clearance_m,
        shock_clearance_m: ds.shock_clearance_m,
    }
}
