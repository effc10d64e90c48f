//! Parameters structure for SteerCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for active steering.
///
/// All outer arrays have one row per steering mode and must agree on the
/// number of modes.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    // ---- SPEED SCHEDULING ----

    /// Speed breakpoints for the front axle angle curve.
    ///
    /// Units: meters/second, strictly increasing per row
    pub front_speeds_ms: Vec<Vec<f64>>,

    /// Front axle steering angle at each speed breakpoint.
    ///
    /// Units: degrees
    pub front_angles_deg: Vec<Vec<f64>>,

    /// Speed breakpoints for the rear axle angle curve.
    ///
    /// Units: meters/second, strictly increasing per row
    pub rear_speeds_ms: Vec<Vec<f64>>,

    /// Rear axle steering angle at each speed breakpoint.
    ///
    /// Units: degrees
    pub rear_angles_deg: Vec<Vec<f64>>,

    // ---- FRICTION CORRECTION OVERLAY ----

    /// Mean-friction breakpoints for the correction overlay.
    ///
    /// Units: percent, strictly decreasing per row. A row of all zeros
    /// disables the overlay for that mode.
    pub adj_frictions_pct: Vec<Vec<f64>>,

    /// Front angle correction at each friction breakpoint.
    ///
    /// Units: degrees
    pub front_adj_deg: Vec<Vec<f64>>,

    /// Rear angle correction at each friction breakpoint.
    ///
    /// Units: degrees
    pub rear_adj_deg: Vec<Vec<f64>>,

    // ---- ENVELOPE ----

    /// Lowest commandable steering angle.
    ///
    /// Units: degrees
    pub min_angle_deg: f64,

    /// Highest commandable steering angle.
    ///
    /// Units: degrees
    pub max_angle_deg: f64,
}
