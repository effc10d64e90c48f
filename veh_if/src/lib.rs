//! # Vehicle interface library
//!
//! This library defines the boundary between the chassis control software and
//! the vehicle itself: the equipment ports the control modules write to, the
//! driver input snapshot they read from, and the driver-facing command
//! grammar.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cmd;
pub mod eqpt;
