//! # Rig driver module
//!
//! Applies module output demands to the equipment ports. All writes go
//! through here so the unit conversions (angles are degrees module-side and
//! radians at the actuators) and the write-only-if-changed rule live in one
//! place.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation3, Vector3};

// Internal
use crate::{air_shock, stab_ctrl::StabDemand, steer_ctrl, susp_ctrl,
    strength_ctrl};
use veh_if::eqpt::{
    power::{ErsPort, ExhaustBank},
    stab::Stabilizer,
    susp::{Corner, SuspensionRig},
};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply a steering demand to the suspension rig.
pub fn apply_steer(rig: &mut dyn SuspensionRig, output: &steer_ctrl::OutputData) {
    let demand = match output.demand {
        Some(d) => d,
        None => return,
    };

    for corner in Corner::ALL.iter() {
        let angle_rad = if corner.is_front() {
            demand.front_angle_deg.to_radians()
        } else {
            demand.rear_angle_deg.to_radians()
        };

        if rig.steer_angle_rad(*corner) != angle_rad {
            rig.set_steer_angle_rad(*corner, angle_rad);
        }
    }
}

/// Apply a ride height demand to the suspension rig.
pub fn apply_heights(rig: &mut dyn SuspensionRig, output: &susp_ctrl::OutputData) {
    let heights_m = match output.heights_m {
        Some(h) => h,
        None => return,
    };

    set_heights(rig, &heights_m);
}

/// Apply a spring strength demand to the suspension rig.
pub fn apply_strengths(
    rig: &mut dyn SuspensionRig,
    output: &strength_ctrl::OutputData,
) {
    let strengths_pct = match output.strengths_pct {
        Some(s) => s,
        None => return,
    };

    for corner in Corner::ALL.iter() {
        let strength_pct = strengths_pct[corner.index()];
        if rig.strength_pct(*corner) != strength_pct {
            rig.set_strength_pct(*corner, strength_pct);
        }
    }
}

/// Apply a tire friction demand to the suspension rig.
pub fn apply_frictions(rig: &mut dyn SuspensionRig, frictions_pct: &Option<[f64; 4]>) {
    let frictions_pct = match frictions_pct {
        Some(f) => f,
        None => return,
    };

    for corner in Corner::ALL.iter() {
        let friction_pct = frictions_pct[corner.index()];
        if rig.friction_pct(*corner) != friction_pct {
            rig.set_friction_pct(*corner, friction_pct);
        }
    }
}

/// Apply an air shock demand to the suspension rig.
pub fn apply_air_shock(
    rig: &mut dyn SuspensionRig,
    output: &air_shock::OutputData,
) {
    match output {
        air_shock::OutputData::None => (),

        air_shock::OutputData::Engage { stow_height_m } => {
            for corner in Corner::ALL.iter() {
                rig.set_air_shock_enabled(*corner, true);
            }
            set_heights(rig, &[*stow_height_m; 4]);
        }

        air_shock::OutputData::Restore { heights_m } => {
            for corner in Corner::ALL.iter() {
                rig.set_air_shock_enabled(*corner, false);
            }
            set_heights(rig, heights_m);
        }
    }
}

/// Apply an ERS engage demand.
pub fn apply_ers(port: &mut dyn ErsPort, engage: Option<bool>) {
    if let Some(engage) = engage {
        if port.engaged() != engage {
            port.set_engaged(engage);
        }
    }
}

/// Apply an exhaust flap demand.
pub fn apply_exhaust(bank: &mut dyn ExhaustBank, open: Option<bool>) {
    if let Some(open) = open {
        if bank.open() != open {
            bank.set_open(open);
        }
    }
}

/// Apply a stabilisation demand to every stabilizer.
///
/// Rate commands are computed in the vehicle frame, carried into the world
/// frame through the vehicle attitude, and then into each stabilizer's own
/// frame through the inverse of its mounting attitude.
pub fn apply_stab(
    stabs: &mut [&mut dyn Stabilizer],
    vehicle_attitude: &Rotation3<f64>,
    demand: &StabDemand,
) {
    match demand {
        StabDemand::None => (),

        StabDemand::Release => {
            for stab in stabs.iter_mut() {
                if stab.override_on() {
                    stab.set_override(false);
                }
            }
        }

        // Hold and roll are re-asserted every cycle: a stabilizer which has
        // dropped its override must be told again
        StabDemand::HoldLevel => {
            for stab in stabs.iter_mut() {
                stab.set_override(true);
                stab.set_rate_rads(Vector3::zeros());
            }
        }

        StabDemand::Roll { roll_rads } => {
            let rate_world =
                vehicle_attitude * Vector3::new(0.0, 0.0, *roll_rads);

            for stab in stabs.iter_mut() {
                let rate_local = stab.attitude().inverse() * rate_world;

                stab.set_override(true);
                stab.set_rate_rads(rate_local);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn set_heights(rig: &mut dyn SuspensionRig, heights_m: &[f64; 4]) {
    for corner in Corner::ALL.iter() {
        let height_m = heights_m[corner.index()];
        if rig.height_m(*corner) != height_m {
            rig.set_height_m(*corner, height_m);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim_rig::SimStabilizer;

    #[test]
    fn test_roll_is_rotated_into_stabilizer_frames() {
        // One stabilizer mounted flat, one yawed 90 degrees about the
        // vehicle up axis
        let mut flat = SimStabilizer::new(Rotation3::identity());
        let mut yawed = SimStabilizer::new(Rotation3::from_axis_angle(
            &Vector3::y_axis(),
            std::f64::consts::FRAC_PI_2,
        ));

        {
            let mut stabs: Vec<&mut dyn Stabilizer> = vec![&mut flat, &mut yawed];

            apply_stab(
                &mut stabs,
                &Rotation3::identity(),
                &StabDemand::Roll { roll_rads: 1.0 },
            );
        }

        assert!(flat.override_on());
        assert!(yawed.override_on());

        // The flat stabilizer sees the roll on its own z axis
        assert!((flat.rate_rads() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);

        // The yawed stabilizer sees the same world-frame rotation on its
        // local x axis instead
        assert!((yawed.rate_rads() - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-9);
    }
}
