//! Main chassis-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - Driver station snapshot
//!             - Suspension sensing
//!         - Command processing and handling
//!         - Clearance elevation calibration
//!         - Control algorithm processing (steering, ride height, spring
//!           strength, ERS, stabilisation, low grip, pit, air shock,
//!           exhaust)
//!         - Equipment driving
//!         - Telemetry
//!
//! # Modules
//!
//! All modules (e.g. `steer_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use chassis_lib::{
    data_store::DataStore,
    features::{FeatureDefaults, FeatureSet},
    rig_driver,
    sim_rig::SimRig,
    tm,
};

mod cmd_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingCmds, ScriptInterpreter},
    session::Session,
};
use veh_if::cmd::FeatureId;
use veh_if::eqpt::{
    helm::Helm,
    power::{ErsPort, ExhaustBank, ServiceCtrl},
    stab::Stabilizer,
    susp::{Corner, SuspensionRig},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("chassis_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Apex Chassis Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE COMMAND SOURCE ----

    let mut cmd_source = CmdSource::None;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading command script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(&args[1])
            .wrap_err("Failed to load command script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} command groups\n",
            si.get_duration(),
            si.get_num_cmds()
        );

        cmd_source = CmdSource::Script(si);
    } else if args.len() == 1 {
        info!("No script provided, running on startup defaults only\n");
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- LOAD PARAMETERS ----

    let feature_defaults: FeatureDefaults = util::params::load("features.toml")
        .wrap_err("Could not load feature defaults")?;

    info!("Feature defaults loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();
    ds.features = FeatureSet::new(&feature_defaults);

    // ---- INITIALISE MODULES ----
    //
    // Configuration failures don't stop the exec: the offending feature is
    // disabled and the problem is reported once below.

    let steering_mode = ds.features.get(FeatureId::Steering).current();
    match ds.steer_ctrl.init(("steer_ctrl.toml", steering_mode), &session) {
        Ok(()) => {
            ds.features.set_max_mode(
                FeatureId::Steering,
                ds.steer_ctrl.num_modes().saturating_sub(1),
            );
            info!("SteerCtrl init complete");
        }
        Err(e) => ds.config_failure(FeatureId::Steering, format!("{}", e)),
    }

    let ride_height_mode = ds.features.get(FeatureId::RideHeight).current();
    match ds
        .susp_ctrl
        .init(("susp_ctrl.toml", ride_height_mode), &session)
    {
        Ok(()) => {
            ds.features.set_max_mode(
                FeatureId::RideHeight,
                ds.susp_ctrl.num_modes().saturating_sub(1),
            );
            info!("SuspCtrl init complete");
        }
        Err(e) => ds.config_failure(FeatureId::RideHeight, format!("{}", e)),
    }

    let strength_mode = ds.features.get(FeatureId::SpringStrength).current();
    match ds
        .strength_ctrl
        .init(("strength_ctrl.toml", strength_mode), &session)
    {
        Ok(()) => {
            ds.features.set_max_mode(
                FeatureId::SpringStrength,
                ds.strength_ctrl.num_modes().saturating_sub(1),
            );
            info!("StrengthCtrl init complete");
        }
        Err(e) => {
            ds.config_failure(FeatureId::SpringStrength, format!("{}", e))
        }
    }

    let ers_mode = ds.features.get(FeatureId::Ers).current();
    match ds.ers_ctrl.init(("ers_ctrl.toml", ers_mode), &session) {
        Ok(()) => {
            ds.features.set_max_mode(
                FeatureId::Ers,
                ds.ers_ctrl.num_modes().saturating_sub(1),
            );
            info!("ErsCtrl init complete");
        }
        Err(e) => ds.config_failure(FeatureId::Ers, format!("{}", e)),
    }

    match ds.stab_ctrl.init("stab_ctrl.toml", &session) {
        Ok(()) => info!("StabCtrl init complete"),
        Err(e) => ds.config_failure(FeatureId::Stab, format!("{}", e)),
    }

    match ds.grip_ctrl.init("grip_ctrl.toml", &session) {
        Ok(()) => info!("GripCtrl init complete"),
        Err(e) => {
            // Both the manual and automatic features share this module
            ds.features.get_mut(FeatureId::Grip).disable();
            ds.config_failure(FeatureId::AutoGrip, format!("{}", e));
        }
    }

    match ds.air_shock.init("air_shock.toml", &session) {
        Ok(()) => info!("AirShock init complete"),
        Err(e) => ds.config_failure(FeatureId::AirShock, format!("{}", e)),
    }

    match ds.elev_cal.init(
        (
            "elev_cal.toml",
            ds.stab_ctrl.configured_clearance_m(),
            ds.air_shock.configured_clearance_m(),
        ),
        &session,
    ) {
        Ok(()) => info!("ElevCal init complete"),
        Err(e) => {
            warn!("ElevCal configuration invalid: {}", e);
            ds.config_errors.push(format!("{}", e));
        }
    }

    match ds.pit_ctrl.init("pit_ctrl.toml", &session) {
        Ok(()) => info!("PitCtrl init complete"),
        Err(e) => ds.config_failure(FeatureId::Pit, format!("{}", e)),
    }

    match ds.exhaust_ctrl.init("exhaust_ctrl.toml", &session) {
        Ok(()) => info!("ExhaustCtrl init complete"),
        Err(e) => ds.config_failure(FeatureId::Exhaust, format!("{}", e)),
    }

    if ds.config_errors.is_empty() {
        info!("Module initialisation complete\n");
    } else {
        warn!(
            "Module initialisation complete with {} configuration error(s):",
            ds.config_errors.len()
        );
        for msg in ds.config_errors.iter() {
            warn!("    {}", msg);
        }
    }

    // ---- INITIALISE EQUIPMENT ----

    // Stands in for hardware discovery, which is the host's concern
    let mut rig = SimRig::new();
    info!("Simulated rig initialised with {} stabilizers", rig.stabs.len());

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut last_cycle_instant: Option<Instant> = None;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Elapsed wall-clock time since the last cycle, shared by every
        // timer this cycle
        let dt_s = match last_cycle_instant {
            Some(instant) => (cycle_start_instant - instant).as_secs_f64(),
            None => CYCLE_PERIOD_S,
        };
        last_cycle_instant = Some(cycle_start_instant);

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- SIMULATED VEHICLE ----

        rig.step(dt_s);

        // ---- DATA INPUT ----
        //
        // All measurements are snapshotted once and reused for every
        // computation within this cycle.

        let helm_report = rig.report();

        let mut heights_m = [0f64; 4];
        let mut strengths_pct = [0f64; 4];
        let mut frictions_pct = [0f64; 4];
        for corner in Corner::ALL.iter() {
            heights_m[corner.index()] = rig.height_m(*corner);
            strengths_pct[corner.index()] = rig.strength_pct(*corner);
            frictions_pct[corner.index()] = rig.friction_pct(*corner);
        }
        let mean_friction_pct = frictions_pct.iter().sum::<f64>() / 4.0;

        // ---- COMMAND PROCESSING ----

        match cmd_source {
            CmdSource::None => (),

            CmdSource::Script(ref mut si) => match si.get_pending_cmds() {
                PendingCmds::None => (),
                PendingCmds::Some(cmd_vec) => {
                    for cmd in cmd_vec.iter() {
                        cmd_processor::exec(&mut ds, cmd);
                    }
                }
                // Exit if end of script reached
                PendingCmds::EndOfScript => {
                    info!("End of command script reached, stopping");
                    break;
                }
            },
        };

        // ---- CLEARANCE CALIBRATION ----

        ds.elev_cal_input = chassis_lib::elev_cal::InputData {
            fwd_stick: helm_report.fwd_stick,
            lat_stick: helm_report.lat_stick,
            elevation_m: helm_report.elevation_m,
        };

        match ds.elev_cal.proc(&ds.elev_cal_input) {
            Ok((o, r)) => {
                if let Some(clearances) = o.clearances {
                    info!(
                        "Clearance elevations calibrated: stab {:.3} m, \
                        shock {:.3} m",
                        clearances.stab_m, clearances.shock_m
                    );
                    ds.stab_clearance_m = Some(clearances.stab_m);
                    ds.shock_clearance_m = Some(clearances.shock_m);
                }
                ds.elev_cal_output = o;
                ds.elev_cal_status_rpt = r;
            }
            Err(e) => warn!("Error during ElevCal processing: {}", e),
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // SteerCtrl processing
        ds.steer_ctrl_input = chassis_lib::steer_ctrl::InputData {
            enabled: ds.features.get(FeatureId::Steering).enabled(),
            speed_ms: helm_report.speed_ms,
            mean_friction_pct,
        };
        match ds.steer_ctrl.proc(&ds.steer_ctrl_input) {
            Ok((o, r)) => {
                ds.steer_ctrl_output = o;
                ds.steer_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during SteerCtrl processing: {}", e),
        }

        // SuspCtrl processing
        ds.susp_ctrl_input = chassis_lib::susp_ctrl::InputData {
            enabled: ds.features.get(FeatureId::RideHeight).enabled(),
            suppressed: ds.air_shock.is_active(),
            lat_stick: helm_report.lat_stick,
            speed_ms: helm_report.speed_ms,
            dt_s,
            heights_m,
        };
        match ds.susp_ctrl.proc(&ds.susp_ctrl_input) {
            Ok((o, r)) => {
                ds.susp_ctrl_output = o;
                ds.susp_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during SuspCtrl processing: {}", e),
        }

        // StrengthCtrl processing
        ds.strength_ctrl_input = chassis_lib::strength_ctrl::InputData {
            enabled: ds.features.get(FeatureId::SpringStrength).enabled(),
            lat_stick: helm_report.lat_stick,
            speed_ms: helm_report.speed_ms,
            dt_s,
            strengths_pct,
        };
        match ds.strength_ctrl.proc(&ds.strength_ctrl_input) {
            Ok((o, r)) => {
                ds.strength_ctrl_output = o;
                ds.strength_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during StrengthCtrl processing: {}", e),
        }

        // ErsCtrl processing
        ds.ers_ctrl_input = chassis_lib::ers_ctrl::InputData {
            enabled: ds.features.get(FeatureId::Ers).enabled(),
            dt_s,
            speed_ms: helm_report.speed_ms,
            engaged: rig.engaged(),
        };
        match ds.ers_ctrl.proc(&ds.ers_ctrl_input) {
            Ok((o, r)) => {
                ds.ers_ctrl_output = o;
                ds.ers_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during ErsCtrl processing: {}", e),
        }

        // StabCtrl processing
        ds.stab_ctrl_input = chassis_lib::stab_ctrl::InputData {
            enabled: ds.features.get(FeatureId::Stab).enabled(),
            recovery_requested: ds.recovery_requested,
            dt_s,
            gravity_ms2: helm_report.gravity_ms2,
            up: helm_report.up,
            right: helm_report.right,
            lat_stick: helm_report.lat_stick,
            rot_stick_mag: helm_report.rot_stick_mag,
            speed_ms: helm_report.speed_ms,
            elevation_m: helm_report.elevation_m,
            mean_friction_pct,
            clearance_elev_m: ds.stab_clearance_m,
        };
        match ds.stab_ctrl.proc(&ds.stab_ctrl_input) {
            Ok((o, r)) => {
                ds.stab_ctrl_output = o;
                ds.stab_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during StabCtrl processing: {}", e),
        }

        // GripCtrl processing
        ds.grip_ctrl_input = chassis_lib::grip_ctrl::InputData {
            manual_enabled: ds.features.get(FeatureId::Grip).enabled(),
            auto_enabled: ds.features.get(FeatureId::AutoGrip).enabled(),
            speed_ms: helm_report.speed_ms,
            velocity_ms: helm_report.velocity_ms,
            forward: helm_report.forward,
            frictions_pct,
        };
        match ds.grip_ctrl.proc(&ds.grip_ctrl_input) {
            Ok((o, r)) => {
                ds.grip_ctrl_output = o;
                ds.grip_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during GripCtrl processing: {}", e),
        }

        // PitCtrl processing
        ds.pit_ctrl_input = chassis_lib::pit_ctrl::InputData {
            enabled: ds.features.get(FeatureId::Pit).enabled(),
            speed_ms: helm_report.speed_ms,
            tire_request: ds.tire_request,
        };
        match ds.pit_ctrl.proc(&ds.pit_ctrl_input) {
            Ok((o, r)) => {
                ds.pit_ctrl_output = o;
                ds.pit_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during PitCtrl processing: {}", e),
        }

        // The pit manoeuvre drives the ride height mode through the same
        // path as driver commands
        if let Some(action) = ds.pit_ctrl_output.susp_mode_action {
            if ds.features.get_mut(FeatureId::RideHeight).apply(&action) {
                ds.rederive(FeatureId::RideHeight);
            }
        }

        // AirShock processing
        ds.air_shock_input = chassis_lib::air_shock::InputData {
            enabled: ds.features.get(FeatureId::AirShock).enabled(),
            gravity_ms2: helm_report.gravity_ms2,
            velocity_ms: helm_report.velocity_ms,
            elevation_m: helm_report.elevation_m,
            clearance_elev_m: ds.shock_clearance_m,
            heights_m,
            shocks_armed: rig.air_shock_enabled(Corner::FL),
        };
        match ds.air_shock.proc(&ds.air_shock_input) {
            Ok((o, r)) => {
                ds.air_shock_output = o;
                ds.air_shock_status_rpt = r;
            }
            Err(e) => warn!("Error during AirShock processing: {}", e),
        }

        // ExhaustCtrl processing
        ds.exhaust_ctrl_input = chassis_lib::exhaust_ctrl::InputData {
            enabled: ds.features.get(FeatureId::Exhaust).enabled(),
            power_frac: helm_report.power_frac,
            speed_ms: helm_report.speed_ms,
            open: rig.open(),
        };
        match ds.exhaust_ctrl.proc(&ds.exhaust_ctrl_input) {
            Ok((o, r)) => {
                ds.exhaust_ctrl_output = o;
                ds.exhaust_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during ExhaustCtrl processing: {}", e),
        }

        // ---- EQUIPMENT DRIVING ----

        rig_driver::apply_steer(&mut rig, &ds.steer_ctrl_output);
        rig_driver::apply_heights(&mut rig, &ds.susp_ctrl_output);
        rig_driver::apply_strengths(&mut rig, &ds.strength_ctrl_output);
        rig_driver::apply_frictions(&mut rig, &ds.grip_ctrl_output.frictions_pct);
        rig_driver::apply_air_shock(&mut rig, &ds.air_shock_output);
        rig_driver::apply_ers(&mut rig, ds.ers_ctrl_output.engage);
        rig_driver::apply_exhaust(&mut rig, ds.exhaust_ctrl_output.open);

        {
            let vehicle_attitude = helm_report.attitude();
            let mut stab_refs: Vec<&mut dyn Stabilizer> = rig
                .stabs
                .iter_mut()
                .map(|s| s as &mut dyn Stabilizer)
                .collect();

            rig_driver::apply_stab(
                &mut stab_refs,
                &vehicle_attitude,
                &ds.stab_ctrl_output.demand,
            );
        }

        // The service controller stands off while any module holds the
        // wheels
        let suspend_service = ds.grip_ctrl_output.suspend_service
            || ds.pit_ctrl_output.suspend_service;
        if rig.enabled() == suspend_service {
            rig.set_enabled(!suspend_service);
        }

        if let Some(on) = ds.pit_ctrl_output.handbrake {
            if rig.handbrake() != on {
                rig.set_handbrake(on);
            }
        }
        if let Some(compound) = ds.pit_ctrl_output.tire_order {
            rig.request_tire(compound);
        }

        // ---- TELEMETRY ----

        let snapshot = tm::snapshot(&ds);
        trace!(
            "TM: {}",
            serde_json::to_string(&snapshot).unwrap_or_default()
        );

        if ds.is_1_hz_cycle {
            session.save("tm/tm_latest.json", snapshot);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the commands incoming to the exec.
#[allow(dead_code)]
enum CmdSource {
    None,
    Script(ScriptInterpreter),
}
