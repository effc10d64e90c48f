//! # Powertrain equipment interfaces

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::cmd::TireCompound;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Port onto the energy recovery system.
pub trait ErsPort {
    fn engaged(&self) -> bool;
    fn set_engaged(&mut self, on: bool);
}

/// Port onto the companion service controller, which handles pit servicing
/// and its own low-level wheel management.
///
/// The service controller is suspended while the chassis software takes
/// direct control of wheel friction, and resumed afterwards.
pub trait ServiceCtrl {
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, on: bool);

    /// Ask the pit crew for a tire change onto the given compound.
    fn request_tire(&mut self, compound: TireCompound);
}

/// Port onto the exhaust flap bank.
pub trait ExhaustBank {
    fn open(&self) -> bool;
    fn set_open(&mut self, open: bool);
}
