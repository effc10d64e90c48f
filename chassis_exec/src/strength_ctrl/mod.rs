//! # Active spring strength module
//!
//! Schedules per-corner spring strength the same way ride height is
//! scheduled, but rate limits every write so strength changes are always
//! gradual, including while cornering.

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

/// Possible errors that can occur during StrengthCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum StrengthCtrlError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid spring strength configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}
