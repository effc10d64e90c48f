//! # Suspension equipment interface

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The four suspension corners, in fixed positional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Corner {
    /// Front left
    FL,
    /// Front right
    FR,
    /// Rear left
    RL,
    /// Rear right
    RR,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Port onto the four wheel suspensions.
///
/// Angles are in radians, heights in meters, strength and friction in
/// percent. Setters are expected to be cheap, callers avoid redundant writes
/// by comparing against the getter first.
pub trait SuspensionRig {
    fn steer_angle_rad(&self, corner: Corner) -> f64;
    fn set_steer_angle_rad(&mut self, corner: Corner, angle_rad: f64);

    fn height_m(&self, corner: Corner) -> f64;
    fn set_height_m(&mut self, corner: Corner, height_m: f64);

    fn strength_pct(&self, corner: Corner) -> f64;
    fn set_strength_pct(&mut self, corner: Corner, strength_pct: f64);

    fn friction_pct(&self, corner: Corner) -> f64;
    fn set_friction_pct(&mut self, corner: Corner, friction_pct: f64);

    fn air_shock_enabled(&self, corner: Corner) -> bool;
    fn set_air_shock_enabled(&mut self, corner: Corner, enabled: bool);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Corner {
    /// All corners in positional order (FL, FR, RL, RR).
    pub const ALL: [Corner; 4] = [Corner::FL, Corner::FR, Corner::RL, Corner::RR];

    /// Index of this corner within [`Corner::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Corner::FL => 0,
            Corner::FR => 1,
            Corner::RL => 2,
            Corner::RR => 3,
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, Corner::FL | Corner::FR)
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Corner::FL | Corner::RL)
    }
}
