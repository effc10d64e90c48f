//! # Feature mode registry
//!
//! Every driver-facing feature has an enable flag and a bounded mode index
//! with memory of the previously selected mode. All mutation goes through
//! [`FeatureMode::apply`], driven by the command grammar. The registry owner
//! must re-derive a module's mode-dependent configuration after any action
//! which reports a mode change.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use veh_if::cmd::{FeatureId, ModeAction};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Enable and mode state for a single feature.
#[derive(Debug, Clone)]
pub struct FeatureMode {
    /// Human readable feature name, used in telemetry.
    name: &'static str,

    /// Whether the feature is currently enabled.
    enabled: bool,

    /// The currently selected mode index.
    current: usize,

    /// The highest valid mode index (inclusive).
    max: usize,

    /// The mode selected before the last mode change.
    previous: usize,
}

/// The registry of all feature modes, indexed by [`FeatureId`].
#[derive(Debug, Clone)]
pub struct FeatureSet {
    modes: Vec<FeatureMode>,
}

/// Startup enable/mode defaults, loaded from `features.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct FeatureDefaults {
    pub steering: FeatureDefault,
    pub ride_height: FeatureDefault,
    pub spring_strength: FeatureDefault,
    pub ers: FeatureDefault,
    pub grip: FeatureDefault,
    pub auto_grip: FeatureDefault,
    pub stab: FeatureDefault,
    pub air_shock: FeatureDefault,
    pub panel: FeatureDefault,
    pub pit: FeatureDefault,
    pub exhaust: FeatureDefault,
}

/// Default state of a single feature.
#[derive(Debug, Default, Deserialize, Clone, Copy)]
pub struct FeatureDefault {
    pub enabled: bool,

    #[serde(default)]
    pub default_mode: usize,
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of telemetry panel screens (the panel's mode index selects one).
pub const NUM_PANEL_SCREENS: usize = 4;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FeatureMode {
    /// Create a new feature with a single mode (index 0).
    pub fn new(name: &'static str, default: FeatureDefault) -> Self {
        FeatureMode {
            name,
            enabled: default.enabled,
            current: 0,
            max: 0,
            previous: 0,
        }
    }

    /// Apply an action to this feature, returning true if the mode index may
    /// have changed and the owning module's configuration must be re-derived.
    pub fn apply(&mut self, action: &ModeAction) -> bool {
        match action {
            ModeAction::Toggle => {
                self.enabled = !self.enabled;
                false
            }
            ModeAction::Increment => {
                self.previous = self.current;
                self.current = (self.current + 1) % (self.max + 1);
                true
            }
            ModeAction::Decrement => {
                self.previous = self.current;
                self.current = if self.current == 0 {
                    self.max
                } else {
                    self.current - 1
                };
                true
            }
            ModeAction::RecallPrevious => {
                std::mem::swap(&mut self.current, &mut self.previous);
                true
            }
            ModeAction::Set(n) => {
                self.previous = self.current;
                self.current = self.clamp_mode(*n);
                true
            }
            ModeAction::Swap(a, b) => {
                let target = if self.current == self.clamp_mode(*a) {
                    *b
                } else {
                    *a
                };
                self.previous = self.current;
                self.current = self.clamp_mode(target);
                true
            }
        }
    }

    /// Disable the feature outright. Only used when the feature's
    /// configuration failed validation, all driver-driven changes go through
    /// [`FeatureMode::apply`].
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Set the highest valid mode index, clamping the current selection into
    /// range. Called once the owning module knows how many modes its
    /// parameters define.
    pub fn set_max_mode(&mut self, max: usize) {
        self.max = max;
        self.current = self.current.min(max);
        self.previous = self.previous.min(max);
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn previous(&self) -> usize {
        self.previous
    }

    pub fn max(&self) -> usize {
        self.max
    }

    fn clamp_mode(&self, mode: i64) -> usize {
        if mode < 0 {
            0
        } else {
            (mode as usize).min(self.max)
        }
    }
}

impl FeatureSet {
    /// Build the registry from the startup defaults.
    ///
    /// Mode-bearing features start with `max = 0`, the owning modules report
    /// their actual mode counts during initialisation via
    /// [`FeatureSet::set_max_mode`].
    pub fn new(defaults: &FeatureDefaults) -> Self {
        let mut modes = vec![];

        for id in FeatureId::ALL.iter() {
            let (name, default) = match id {
                FeatureId::Steering => ("Active Steering", defaults.steering),
                FeatureId::RideHeight => ("Active Ride Height", defaults.ride_height),
                FeatureId::SpringStrength => {
                    ("Active Spring Strength", defaults.spring_strength)
                }
                FeatureId::Ers => ("Auto ERS", defaults.ers),
                FeatureId::Grip => ("Low Grip Override", defaults.grip),
                FeatureId::AutoGrip => ("Auto Low Grip", defaults.auto_grip),
                FeatureId::Stab => ("Stability Assist", defaults.stab),
                FeatureId::AirShock => ("Air Shock", defaults.air_shock),
                FeatureId::Panel => ("Telemetry Panel", defaults.panel),
                FeatureId::Pit => ("Pit Manoeuvre", defaults.pit),
                FeatureId::Exhaust => ("Exhaust Flaps", defaults.exhaust),
            };

            let mut mode = FeatureMode::new(name, default);
            mode.current = default.default_mode;
            mode.previous = mode.current;

            match id {
                // The panel's screen count is fixed
                FeatureId::Panel => mode.set_max_mode(NUM_PANEL_SCREENS - 1),

                // These features report their mode counts once their
                // modules have loaded parameters, the default selection is
                // clamped at that point
                FeatureId::Steering
                | FeatureId::RideHeight
                | FeatureId::SpringStrength
                | FeatureId::Ers => (),

                // Everything else is a plain toggle
                _ => mode.set_max_mode(0),
            }

            modes.push(mode);
        }

        FeatureSet { modes }
    }

    pub fn get(&self, id: FeatureId) -> &FeatureMode {
        &self.modes[id.index()]
    }

    pub fn get_mut(&mut self, id: FeatureId) -> &mut FeatureMode {
        &mut self.modes[id.index()]
    }

    /// Set a feature's mode count and re-clamp its defaults.
    pub fn set_max_mode(&mut self, id: FeatureId, max: usize) {
        self.modes[id.index()].set_max_mode(max);
    }

    /// Iterate over all features in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &FeatureMode)> {
        FeatureId::ALL.iter().copied().zip(self.modes.iter())
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        FeatureSet::new(&FeatureDefaults::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn feature(max: usize, current: usize) -> FeatureMode {
        let mut f = FeatureMode::new(
            "Test Feature",
            FeatureDefault {
                enabled: true,
                default_mode: 0,
            },
        );
        f.set_max_mode(max);
        f.apply(&ModeAction::Set(current as i64));
        f.previous = f.current;
        f
    }

    #[test]
    fn test_increment_wraps() {
        let mut f = feature(2, 0);

        // max + 1 increments must return to the starting mode
        for _ in 0..3 {
            f.apply(&ModeAction::Increment);
        }
        assert_eq!(f.current(), 0);
        assert_eq!(f.previous(), 2);
    }

    #[test]
    fn test_decrement_inverts_increment() {
        let mut f = feature(3, 1);

        f.apply(&ModeAction::Increment);
        f.apply(&ModeAction::Decrement);
        assert_eq!(f.current(), 1);

        // And wraps below zero
        f.apply(&ModeAction::Set(0));
        f.apply(&ModeAction::Decrement);
        assert_eq!(f.current(), 3);
    }

    #[test]
    fn test_recall_previous_swaps() {
        let mut f = feature(3, 1);

        f.apply(&ModeAction::Set(3));
        assert_eq!((f.current(), f.previous()), (3, 1));

        f.apply(&ModeAction::RecallPrevious);
        assert_eq!((f.current(), f.previous()), (1, 3));
    }

    #[test]
    fn test_swap_is_an_involution() {
        let mut f = feature(2, 0);

        f.apply(&ModeAction::Swap(0, 1));
        assert_eq!(f.current(), 1);

        f.apply(&ModeAction::Swap(0, 1));
        assert_eq!(f.current(), 0);
    }

    #[test]
    fn test_set_clamps_into_range() {
        let mut f = feature(2, 0);

        f.apply(&ModeAction::Set(100));
        assert_eq!(f.current(), 2);

        f.apply(&ModeAction::Set(-3));
        assert_eq!(f.current(), 0);
    }

    #[test]
    fn test_toggle_leaves_modes_untouched() {
        let mut f = feature(2, 1);
        f.apply(&ModeAction::Set(2));

        let rederive = f.apply(&ModeAction::Toggle);
        assert!(!rederive);
        assert!(!f.enabled());
        assert_eq!((f.current(), f.previous()), (2, 1));
    }
}
