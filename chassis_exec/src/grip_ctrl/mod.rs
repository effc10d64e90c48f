//! # Low grip control module
//!
//! Ramps all four tire frictions down into the low-grip band, either on
//! explicit driver demand or automatically when the vehicle is sliding
//! sideways at speed. While the chassis software holds the friction the
//! companion service controller is suspended so the two don't fight over
//! the wheels.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Velocity magnitudes below this can't produce a meaningful drift angle.
pub const VELOCITY_EPSILON_MS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during GripCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum GripCtrlError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid low grip configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}
