//! Parameters structure for SuspCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for active ride height.
///
/// All per-mode arrays must agree on the number of modes.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Maximum height change applied per cycle when returning to neutral.
    ///
    /// Units: meters
    pub height_step_m: f64,

    /// How long the lateral stick must stay neutral before the ride height
    /// starts returning to neutral.
    ///
    /// Units: seconds
    pub neutral_dwell_s: f64,

    /// Neutral ride height per mode.
    ///
    /// Units: meters
    pub neutral_heights_m: Vec<f64>,

    /// Speed breakpoints for the cornering height curves.
    ///
    /// Units: meters/second, strictly increasing per row
    pub turn_speeds_ms: Vec<Vec<f64>>,

    /// Cornering height of the front inside corner.
    ///
    /// Units: meters
    pub front_inside_heights_m: Vec<Vec<f64>>,

    /// Cornering height of the front outside corner.
    ///
    /// Units: meters
    pub front_outside_heights_m: Vec<Vec<f64>>,

    /// Cornering height of the rear inside corner.
    ///
    /// Units: meters
    pub rear_inside_heights_m: Vec<Vec<f64>>,

    /// Cornering height of the rear outside corner.
    ///
    /// Units: meters
    pub rear_outside_heights_m: Vec<Vec<f64>>,
}
