//! # Helm (driver station) interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Snapshot of everything the driver station can measure.
///
/// One report is taken at the start of each control cycle and reused for
/// every computation within that cycle, so all modules see a consistent view.
#[derive(Debug, Clone, Serialize)]
pub struct HelmReport {
    /// Vehicle speed over ground.
    ///
    /// Units: meters/second, always >= 0
    pub speed_ms: f64,

    /// Lateral stick deflection, -1 (full left) to +1 (full right).
    pub lat_stick: f64,

    /// Forward stick deflection, -1 (full brake) to +1 (full throttle).
    pub fwd_stick: f64,

    /// Combined magnitude of the rotation stick axes.
    pub rot_stick_mag: f64,

    /// Vehicle up axis in the world frame, unit length.
    pub up: Vector3<f64>,

    /// Vehicle right axis in the world frame, unit length.
    pub right: Vector3<f64>,

    /// Vehicle forward axis in the world frame, unit length.
    pub forward: Vector3<f64>,

    /// Natural gravity vector in the world frame.
    ///
    /// Units: meters/second^2
    pub gravity_ms2: Vector3<f64>,

    /// Linear velocity in the world frame.
    ///
    /// Units: meters/second
    pub velocity_ms: Vector3<f64>,

    /// Elevation above the reference surface from the external estimator.
    ///
    /// Units: meters
    pub elevation_m: f64,

    /// Fraction of maximum power output currently produced, 0 to 1.
    pub power_frac: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Port onto the driver station.
pub trait Helm {
    /// Take a measurement snapshot.
    fn report(&self) -> HelmReport;

    fn handbrake(&self) -> bool;
    fn set_handbrake(&mut self, on: bool);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HelmReport {
    /// The vehicle's attitude as a rotation taking vehicle-frame vectors
    /// (x right, y up, z forward) into the world frame.
    pub fn attitude(&self) -> Rotation3<f64> {
        Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[
            self.right,
            self.up,
            self.forward,
        ]))
    }
}

impl Default for HelmReport {
    fn default() -> Self {
        HelmReport {
            speed_ms: 0.0,
            lat_stick: 0.0,
            fwd_stick: 0.0,
            rot_stick_mag: 0.0,
            up: Vector3::y(),
            right: Vector3::x(),
            forward: Vector3::z(),
            gravity_ms2: Vector3::new(0.0, -9.81, 0.0),
            velocity_ms: Vector3::zeros(),
            elevation_m: 0.0,
            power_frac: 0.0,
        }
    }
}
