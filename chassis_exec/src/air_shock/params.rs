//! Parameters structure for AirShock

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the air shock.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Downward speed beyond which the vehicle counts as falling.
    ///
    /// Units: meters/second, sign is ignored
    pub descent_speed_ms: f64,

    /// Height the corners are dropped to while the dampers are armed.
    ///
    /// Units: meters
    pub stow_height_m: f64,

    /// Elevation above which a fast descent arms the dampers. Zero selects
    /// automatic calibration from driving elevation samples.
    ///
    /// Units: meters
    pub clearance_elev_m: f64,
}
