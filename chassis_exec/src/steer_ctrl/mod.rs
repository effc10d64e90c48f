//! # Active steering module
//!
//! Schedules the maximum front and rear wheel steering angles against
//! vehicle speed, with an additive correction overlay indexed by falling
//! tire friction for low-grip surfaces.

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

/// Possible errors that can occur during SteerCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum SteerCtrlError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid steering configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}
