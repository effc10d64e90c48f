//! # Chassis control library
//!
//! This library contains all control modules run by the `chassis_exec`
//! executable. Each module lives in its own directory and implements the
//! `util::module::State` trait: `init` loads its TOML parameters and builds
//! the derived per-mode configuration, `proc` performs one control cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod air_shock;
pub mod data_store;
pub mod elev_cal;
pub mod ers_ctrl;
pub mod exhaust_ctrl;
pub mod features;
pub mod grip_ctrl;
pub mod pit_ctrl;
pub mod rig_driver;
pub mod sim_rig;
pub mod stab_ctrl;
pub mod steer_ctrl;
pub mod strength_ctrl;
pub mod susp_ctrl;
pub mod tm;
