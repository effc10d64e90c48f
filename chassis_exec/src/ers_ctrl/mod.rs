//! # Auto ERS module
//!
//! Pulses the energy recovery system on a fixed duty cycle, with the "on"
//! window further gated by a speed step table so the assist only fires in
//! the speed bands where it pays off.

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

/// Possible errors that can occur during ErsCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ErsCtrlError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid ERS configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}
