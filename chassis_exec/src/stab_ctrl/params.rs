//! Parameters structure for StabCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for stabilisation and auto-recovery.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Tilt from upright beyond which auto-recovery engages.
    ///
    /// Units: degrees
    pub activation_angle_deg: f64,

    /// Roll rate commanded during recovery.
    ///
    /// Units: revolutions/minute
    pub max_rate_rpm: f64,

    /// Whether steady-state hold-level stabilisation is used at all.
    /// Recovery runs regardless.
    pub hold_level: bool,

    /// How long the lateral stick must stay neutral before the hold-level
    /// override re-engages.
    ///
    /// Units: seconds
    pub reengage_dwell_s: f64,

    /// Minimum speed for hold-level stabilisation.
    ///
    /// Units: meters/second
    pub min_speed_ms: f64,

    /// Mean frictions at or below this imply the wheels are already in the
    /// low-grip band and the stabilizers should stay passive.
    ///
    /// Units: percent
    pub low_grip_friction_pct: f64,

    /// Elevation above which hold-level stabilisation engages. Zero selects
    /// automatic calibration from driving elevation samples.
    ///
    /// Units: meters
    pub clearance_elev_m: f64,
}
