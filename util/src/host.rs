//! Host platform utility functions

use std::path::PathBuf;

/// Get the root directory of the chassis software installation from the
/// `APEX_SW_ROOT` environment variable.
pub fn get_apex_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("APEX_SW_ROOT")?))
}
