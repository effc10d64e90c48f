//! # Air shock module
//!
//! Watches for the vehicle falling from height. When it is descending fast
//! above the clearance elevation the air-shock dampers are armed on all four
//! corners and the chassis is dropped to the stowed height for landing. Once
//! back on the ground the dampers are disarmed and the pre-engagement
//! heights restored.

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
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during AirShock operation.
#[derive(Debug, thiserror::Error)]
pub enum AirShockError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),
}
