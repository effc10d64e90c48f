//! # Stabilisation and auto-recovery module
//!
//! Watches the vehicle's orientation against gravity once per cycle. A
//! vehicle tipped past the activation angle gets a constant-rate roll
//! command opposing the tilt until it is upright again. Otherwise, once the
//! driver has left the sticks alone for the re-engagement dwell, the
//! stabilizers are asserted with a zero-rate override to hold the chassis
//! level through jumps and low-grip sections.

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

/// Gravity magnitudes below this are treated as free fall, in which there is
/// no "up" to stabilise against.
pub const GRAVITY_EPSILON_MS2: f64 = 1e-6;

/// Rotation stick magnitudes above this count as the driver commanding
/// rotation.
pub const ROT_STICK_EPSILON: f64 = 0.01;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during StabCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum StabCtrlError {
    #[error("Cannot load parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),
}
