//! # Active ride height module
//!
//! Holds the chassis at the mode's neutral ride height while driving
//! straight, and drops each corner onto its inside/outside cornering height
//! while the lateral stick is deflected. The return to neutral is deferred
//! by a dwell and rate limited so the chassis settles rather than snapping.

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

/// Possible errors that can occur during SuspCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SuspCtrlError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid ride height configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}
