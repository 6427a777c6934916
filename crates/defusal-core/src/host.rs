//! Collaborator traits implemented by the host simulation.
//!
//! The bridge does not know how bombs, timers, or missions work. It
//! reads bomb state through [`BombInfo`], forwards commands through
//! [`MissionCommands`], and (for headless hosts driven by the runner)
//! advances time through [`SteppedSimulation`]. All of these are called
//! on the simulation thread only.

use std::time::Duration;

use defusal_types::BombEvent;

/// Read access to the bomb currently in play.
pub trait BombInfo {
    /// Timer formatted for display (for example `"04:59"`).
    fn formatted_time(&self) -> String;

    /// Strikes the bomb has taken.
    fn strike_count(&self) -> u32;

    /// Every module on the bomb.
    fn module_ids(&self) -> Vec<String>;

    /// Modules that can be solved.
    fn solvable_module_ids(&self) -> Vec<String>;

    /// Modules already solved.
    fn solved_module_ids(&self) -> Vec<String>;
}

/// Mutations the bridge forwards to the host.
///
/// Neither method reports failure: an unknown mission or a strike with
/// no bomb in play is the host's to absorb.
pub trait MissionCommands {
    /// Load and start the given mission.
    fn start_mission(&mut self, mission_id: &str, seed: &str);

    /// Give the active bomb a strike.
    fn cause_strike(&mut self, reason: &str);
}

/// A host that can be both read and commanded.
pub trait BombHost: BombInfo + MissionCommands {}

impl<T: BombInfo + MissionCommands + ?Sized> BombHost for T {}

/// A host whose clock is advanced externally, one tick at a time.
///
/// Used by [`run_simulation`](crate::runner::run_simulation) for
/// headless hosts. Events returned from `step` are fed to the state
/// store in order before the tick's commands are drained.
pub trait SteppedSimulation: BombHost {
    /// Advance the host by `dt` and report what happened.
    fn step(&mut self, dt: Duration) -> Vec<BombEvent>;
}
