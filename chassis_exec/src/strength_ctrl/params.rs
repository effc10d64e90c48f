//! Parameters structure for StrengthCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for active spring strength.
///
/// All per-mode arrays must agree on the number of modes.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Maximum strength change applied per cycle.
    ///
    /// Units: percent
    pub strength_step_pct: f64,

    /// How long the lateral stick must stay neutral before strength starts
    /// returning to the neutral schedule.
    ///
    /// Units: seconds
    pub neutral_dwell_s: f64,

    /// Speed breakpoints for all strength curves.
    ///
    /// Units: meters/second, strictly increasing per row
    pub speeds_ms: Vec<Vec<f64>>,

    /// Neutral strength at each speed breakpoint.
    ///
    /// Units: percent
    pub neutral_pct: Vec<Vec<f64>>,

    /// Cornering strength of the front inside corner.
    ///
    /// Units: percent
    pub front_inside_pct: Vec<Vec<f64>>,

    /// Cornering strength of the front outside corner.
    ///
    /// Units: percent
    pub front_outside_pct: Vec<Vec<f64>>,

    /// Cornering strength of the rear inside corner.
    ///
    /// Units: percent
    pub rear_inside_pct: Vec<Vec<f64>>,

    /// Cornering strength of the rear outside corner.
    ///
    /// Units: percent
    pub rear_outside_pct: Vec<Vec<f64>>,
}
