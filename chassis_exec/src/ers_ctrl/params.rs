//! Parameters structure for ErsCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the auto ERS.
///
/// All per-mode arrays must agree on the number of modes.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Fraction of each period the ERS may fire for, per mode. 0.8 is an
    /// 80% duty cycle.
    pub duty_cycles: Vec<f64>,

    /// Length of one on/off period, per mode.
    ///
    /// Units: seconds
    pub period_s: Vec<f64>,

    /// Speed thresholds of the enable step table, per mode.
    ///
    /// Units: meters/second, strictly increasing per row
    pub speeds_ms: Vec<Vec<f64>>,

    /// Whether the ERS is allowed in the band starting at the matching
    /// threshold.
    pub enable_states: Vec<Vec<bool>>,
}
