//! The immutable bomb snapshot served to network clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Phase;

/// Observable bomb state at one point in time.
///
/// Built wholesale on the simulation thread and never mutated after it
/// is published. Field names serialize in `PascalCase`, which is the
/// layout existing clients parse:
///
/// ```json
/// {"Time":"04:59","Strikes":0,"Modules":[],"SolvableModules":[],"SolvedModules":[],"BombState":"Active"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "PascalCase")]
#[ts(export, export_to = "bindings/")]
pub struct BombSnapshot {
    /// Formatted timer, elapsed or remaining depending on the mission.
    pub time: String,
    /// Strikes the bomb has taken.
    pub strikes: u32,
    /// Every module on the bomb, in host order.
    pub modules: Vec<String>,
    /// Modules that can be solved (excludes needy modules).
    pub solvable_modules: Vec<String>,
    /// Modules already solved.
    pub solved_modules: Vec<String>,
    /// Current phase.
    pub bomb_state: Phase,
}

impl BombSnapshot {
    /// The snapshot served before anything has been published.
    pub fn not_started() -> Self {
        Self::default()
    }
}
