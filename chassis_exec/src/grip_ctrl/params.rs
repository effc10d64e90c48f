//! Parameters structure for GripCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for low grip control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Friction the wheels are taken down to, clamped into the low-grip
    /// band on load.
    ///
    /// Units: percent
    pub low_friction_pct: f64,

    /// Maximum friction change applied per cycle.
    ///
    /// Units: percent
    pub friction_step_pct: f64,

    /// Minimum speed for automatic activation.
    ///
    /// Units: meters/second
    pub auto_min_speed_ms: f64,

    /// Speed breakpoints for the drift angle threshold curve.
    ///
    /// Units: meters/second, strictly increasing
    pub auto_speeds_ms: Vec<f64>,

    /// Drift angle beyond which the automatic mode engages, at each speed
    /// breakpoint.
    ///
    /// Units: degrees
    pub auto_angles_deg: Vec<f64>,
}
