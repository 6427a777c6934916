//! Enumeration types for the bomb lifecycle.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Coarse lifecycle state of the bomb as seen by clients.
///
/// `Exploded` and `Defused` are terminal: only a reset returns the
/// phase to `NotActive`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// No bomb is in play.
    #[default]
    #[serde(rename = "NA")]
    NotActive,
    /// A bomb is live and the timer is running.
    Active,
    /// The bomb went off.
    Exploded,
    /// Every solvable module was solved.
    Defused,
}

impl Phase {
    /// Whether this phase only changes through a reset.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exploded | Self::Defused)
    }

    /// The name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotActive => "NA",
            Self::Active => "Active",
            Self::Exploded => "Exploded",
            Self::Defused => "Defused",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game-flow state reported by the host's state-change notifier.
///
/// Only `Gameplay` is meaningful to the phase machine; every other
/// state counts as "gameplay ended".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GameState {
    /// Title / unlock screen.
    Unlock,
    /// Loading between rooms.
    Transitioning,
    /// A bomb is in play.
    Gameplay,
    /// The setup room where missions are chosen.
    Setup,
    /// Results screen after a bomb ends.
    PostGame,
    /// The host is shutting down.
    Quitting,
}

impl GameState {
    /// Whether this state means a bomb is in play.
    pub const fn is_gameplay(self) -> bool {
        matches!(self, Self::Gameplay)
    }
}
