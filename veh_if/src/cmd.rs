//! # Command grammar
//!
//! Driver commands arrive as lines of whitespace-separated tokens. A token is
//! either a feature name (which toggles that feature unless immediately
//! followed by a mode modifier), the `FLIP` keyword, or a tire compound
//! requesting a pit manoeuvre.
//!
//! Mode modifiers are `+1` (next mode), `-1` (previous mode in the cycle),
//! `P` (recall the previously selected mode), a bare integer (select that
//! mode), or `a:b` (swap between two modes). A modifier that looks numeric
//! but fails to parse degrades the command to a plain toggle, this matches
//! the long-standing behaviour drivers rely on and is deliberate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Closed set of features addressable from the command grammar.
///
/// Each feature maps to exactly one control module in `chassis_exec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeatureId {
    /// Active steering (speed-scheduled wheel angles)
    Steering,
    /// Active ride height
    RideHeight,
    /// Active spring strength
    SpringStrength,
    /// Duty-cycled energy recovery assist
    Ers,
    /// Manual low-grip friction override
    Grip,
    /// Automatic low-grip friction control
    AutoGrip,
    /// Stabilisation and auto-recovery
    Stab,
    /// Airborne damper control
    AirShock,
    /// Telemetry panel screen selection
    Panel,
    /// Pit-stop manoeuvre
    Pit,
    /// Exhaust flap control
    Exhaust,
}

/// A mutation to apply to a feature's enable/mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    /// Flip the feature's enabled flag.
    Toggle,
    /// Advance to the next mode, wrapping past the last.
    Increment,
    /// Step back to the previous mode in the cycle, wrapping past zero.
    Decrement,
    /// Swap back to the previously selected mode.
    RecallPrevious,
    /// Select a specific mode (clamped into range on application).
    Set(i64),
    /// Two-way quick swap: if the current mode is `.0` select `.1`,
    /// otherwise select `.0`.
    Swap(i64, i64),
}

/// Tire compounds the pit crew can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TireCompound {
    Ultra,
    Soft,
    Medium,
    Hard,
    Intermediate,
    Wet,
}

/// A single parsed driver command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cmd {
    /// Mutate a feature's enable/mode state.
    Mode {
        feature: FeatureId,
        action: ModeAction,
    },

    /// Request a manual roll-over recovery.
    Flip,

    /// Request a pit stop onto the given compound.
    Tire(TireCompound),
}

/// Possible command parsing errors.
#[derive(Debug, Error)]
pub enum CmdParseError {
    #[error("Unrecognised command token: {0}")]
    UnknownToken(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FeatureId {
    /// All features, in registry order.
    pub const ALL: [FeatureId; 11] = [
        FeatureId::Steering,
        FeatureId::RideHeight,
        FeatureId::SpringStrength,
        FeatureId::Ers,
        FeatureId::Grip,
        FeatureId::AutoGrip,
        FeatureId::Stab,
        FeatureId::AirShock,
        FeatureId::Panel,
        FeatureId::Pit,
        FeatureId::Exhaust,
    ];

    /// The command token addressing this feature.
    pub fn token(&self) -> &'static str {
        match self {
            FeatureId::Steering => "STEER",
            FeatureId::RideHeight => "SUSP",
            FeatureId::SpringStrength => "STR",
            FeatureId::Ers => "ERS",
            FeatureId::Grip => "GRIP",
            FeatureId::AutoGrip => "AGRIP",
            FeatureId::Stab => "STAB",
            FeatureId::AirShock => "AIRS",
            FeatureId::Panel => "PANEL",
            FeatureId::Pit => "PIT",
            FeatureId::Exhaust => "EXH",
        }
    }

    /// Index of this feature within [`FeatureId::ALL`].
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap()
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.token() == token)
    }
}

impl TireCompound {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "ULTRA" => Some(TireCompound::Ultra),
            "SOFT" => Some(TireCompound::Soft),
            "MEDIUM" => Some(TireCompound::Medium),
            "HARD" => Some(TireCompound::Hard),
            "INT" => Some(TireCompound::Intermediate),
            "WET" => Some(TireCompound::Wet),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse a line of whitespace-separated command tokens.
pub fn parse_line(line: &str) -> Result<Vec<Cmd>, CmdParseError> {
    let tokens: Vec<String> = line
        .split_whitespace()
        .map(|t| t.to_uppercase())
        .collect();

    let mut cmds = vec![];
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_str();

        if let Some(feature) = FeatureId::from_token(token) {
            // A feature followed by a modifier consumes both tokens. A
            // following token which is itself a command is left for its own
            // iteration and the feature degrades to a toggle.
            let modifier = tokens
                .get(i + 1)
                .and_then(|next| parse_modifier(next));

            match modifier {
                Some(action) => {
                    cmds.push(Cmd::Mode { feature, action });
                    i += 2;
                }
                None => {
                    cmds.push(Cmd::Mode {
                        feature,
                        action: ModeAction::Toggle,
                    });
                    i += 1;
                }
            }
            continue;
        }

        if token == "FLIP" {
            cmds.push(Cmd::Flip);
            i += 1;
            continue;
        }

        if let Some(compound) = TireCompound::from_token(token) {
            cmds.push(Cmd::Tire(compound));
            i += 1;
            continue;
        }

        return Err(CmdParseError::UnknownToken(tokens[i].clone()));
    }

    Ok(cmds)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Interpret a token as a mode modifier, or `None` if the token stands on its
/// own (another command) and the preceding feature should just toggle.
fn parse_modifier(token: &str) -> Option<ModeAction> {
    match token {
        "-1" => return Some(ModeAction::Decrement),
        "+1" => return Some(ModeAction::Increment),
        "P" => return Some(ModeAction::RecallPrevious),
        _ => (),
    }

    if token.contains(':') {
        let mut parts = token.splitn(2, ':');

        // Halves that fail to parse fall back to mode 0
        let a = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        let b = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);

        return Some(ModeAction::Swap(a, b));
    }

    if let Ok(n) = token.parse::<i64>() {
        return Some(ModeAction::Set(n));
    }

    // Another command keeps its own meaning
    if FeatureId::from_token(token).is_some()
        || token == "FLIP"
        || TireCompound::from_token(token).is_some()
    {
        return None;
    }

    // A mode argument that isn't a number degrades the command to a toggle
    warn!(
        "Mode argument \"{}\" is not a number, treating command as a toggle",
        token
    );
    Some(ModeAction::Toggle)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_single_tokens() {
        assert_eq!(
            parse_line("steer").unwrap(),
            vec![Cmd::Mode {
                feature: FeatureId::Steering,
                action: ModeAction::Toggle
            }]
        );
        assert_eq!(parse_line("FLIP").unwrap(), vec![Cmd::Flip]);
        assert_eq!(
            parse_line("soft").unwrap(),
            vec![Cmd::Tire(TireCompound::Soft)]
        );
        assert!(parse_line("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(
            parse_line("SUSP +1").unwrap(),
            vec![Cmd::Mode {
                feature: FeatureId::RideHeight,
                action: ModeAction::Increment
            }]
        );
        assert_eq!(
            parse_line("SUSP -1").unwrap(),
            vec![Cmd::Mode {
                feature: FeatureId::RideHeight,
                action: ModeAction::Decrement
            }]
        );
        assert_eq!(
            parse_line("SUSP P").unwrap(),
            vec![Cmd::Mode {
                feature: FeatureId::RideHeight,
                action: ModeAction::RecallPrevious
            }]
        );
        assert_eq!(
            parse_line("STEER 2").unwrap(),
            vec![Cmd::Mode {
                feature: FeatureId::Steering,
                action: ModeAction::Set(2)
            }]
        );
        assert_eq!(
            parse_line("SUSP 0:1").unwrap(),
            vec![Cmd::Mode {
                feature: FeatureId::RideHeight,
                action: ModeAction::Swap(0, 1)
            }]
        );
    }

    #[test]
    fn test_malformed_mode_degrades_to_toggle() {
        assert_eq!(
            parse_line("STEER fast").unwrap(),
            vec![Cmd::Mode {
                feature: FeatureId::Steering,
                action: ModeAction::Toggle
            }]
        );

        // Unparseable swap halves fall back to zero
        assert_eq!(
            parse_line("SUSP x:1").unwrap(),
            vec![Cmd::Mode {
                feature: FeatureId::RideHeight,
                action: ModeAction::Swap(0, 1)
            }]
        );
    }

    #[test]
    fn test_adjacent_commands_keep_their_meaning() {
        assert_eq!(
            parse_line("STEER SUSP").unwrap(),
            vec![
                Cmd::Mode {
                    feature: FeatureId::Steering,
                    action: ModeAction::Toggle
                },
                Cmd::Mode {
                    feature: FeatureId::RideHeight,
                    action: ModeAction::Toggle
                }
            ]
        );
        assert_eq!(
            parse_line("ERS +1 FLIP").unwrap(),
            vec![
                Cmd::Mode {
                    feature: FeatureId::Ers,
                    action: ModeAction::Increment
                },
                Cmd::Flip
            ]
        );
    }

    #[test]
    fn test_unknown_token_is_an_error() {
        assert!(matches!(
            parse_line("WARP 9"),
            Err(CmdParseError::UnknownToken(t)) if t == "WARP"
        ));
    }
}
