//! Commands requested over the network and executed on the simulation
//! thread.
//!
//! A [`Command`] is a description of a mutation, never a closure over
//! host objects. The network thread builds it from request parameters;
//! the simulation thread interprets the tag and calls the host.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A mutation to apply to the simulation on its own thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Command {
    /// Load and start a mission.
    StartMission {
        /// Mission identifier as understood by the host.
        mission_id: String,
        /// Seed for the bomb generator. Passed through unvalidated.
        seed: String,
    },
    /// Give the active bomb a strike.
    CauseStrike {
        /// Free-form reason recorded by the host.
        reason: String,
    },
}

impl Command {
    /// Build a [`Command::StartMission`].
    pub fn start_mission(mission_id: impl Into<String>, seed: impl Into<String>) -> Self {
        Self::StartMission {
            mission_id: mission_id.into(),
            seed: seed.into(),
        }
    }

    /// Build a [`Command::CauseStrike`].
    pub fn cause_strike(reason: impl Into<String>) -> Self {
        Self::CauseStrike {
            reason: reason.into(),
        }
    }

    /// Short name for log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StartMission { .. } => "start_mission",
            Self::CauseStrike { .. } => "cause_strike",
        }
    }
}
