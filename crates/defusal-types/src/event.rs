//! Events raised by the host simulation.

use serde::{Deserialize, Serialize};

use crate::enums::GameState;

/// Something the host reported that may move the bomb phase.
///
/// These replace callback subscriptions: the host hands events to the
/// state store on the simulation thread instead of invoking closures
/// that capture shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombEvent {
    /// The host's game-flow state changed.
    GameStateChanged(GameState),
    /// The bomb exploded.
    Exploded,
    /// The bomb was solved.
    Solved,
    /// A new session is starting; clear any terminal phase.
    Reset,
}
