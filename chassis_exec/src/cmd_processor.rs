//! # Command processor module
//!
//! The command processor handles parsed driver commands coming from any
//! source and applies them to the feature registry.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use chassis_lib::data_store::DataStore;
use veh_if::cmd::Cmd;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a driver command.
///
/// Mutates the datastore to pass requests on to the control modules. Any
/// mode change triggers re-derivation of the owning module's configuration
/// before this cycle's outputs are computed.
pub(crate) fn exec(ds: &mut DataStore, cmd: &Cmd) {
    match cmd {
        Cmd::Mode { feature, action } => {
            let mode = ds.features.get_mut(*feature);
            let mode_changed = mode.apply(action);

            info!(
                "{}: {}, mode {}",
                mode.name(),
                if mode.enabled() { "enabled" } else { "disabled" },
                mode.current()
            );

            if mode_changed {
                ds.rederive(*feature);
            }
        }

        Cmd::Flip => {
            debug!("Recieved manual recovery command");
            ds.recovery_requested = true;
        }

        Cmd::Tire(compound) => {
            debug!("Recieved tire command: {:?}", compound);
            ds.tire_request = Some(*compound);
        }
    }
}
