//! # Stabilizer equipment interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Rotation3, Vector3};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Port onto a single stabilizer (torque gyro).
///
/// Stabilizers may be mounted at arbitrary orientations, so rate commands
/// must be expressed in the stabilizer's own frame. The controller computes
/// rates in the vehicle frame and rotates them through
/// [`Stabilizer::attitude`] before writing.
pub trait Stabilizer {
    /// The stabilizer's attitude as a rotation taking its local frame into
    /// the world frame.
    fn attitude(&self) -> Rotation3<f64>;

    /// True while the stabilizer is accepting rate overrides.
    fn override_on(&self) -> bool;

    /// Enable or disable the rate override. While disabled the stabilizer
    /// provides its own passive damping.
    fn set_override(&mut self, on: bool);

    /// Command a rotation rate in the stabilizer's local frame (pitch about
    /// x, yaw about y, roll about z).
    ///
    /// Units: radians/second
    fn set_rate_rads(&mut self, rate_rads: Vector3<f64>);
}
