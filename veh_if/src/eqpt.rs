//! # Equipment interfaces
//!
//! Ports onto the physical vehicle. Discovery and naming of the underlying
//! hardware is the host's responsibility, the control software is handed
//! implementations of these traits and never allocates equipment itself.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod helm;
pub mod power;
pub mod stab;
pub mod susp;
