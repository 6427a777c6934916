//! Simulation-thread state: the bomb phase machine and command
//! dispatch.
//!
//! # Phase transitions
//!
//! | From | Event | To |
//! |------|-------|----|
//! | any | `Reset` | `NotActive` |
//! | `Exploded` / `Defused` | anything else | unchanged |
//! | non-terminal | `Exploded` | `Exploded` |
//! | non-terminal | `Solved` | `Defused` |
//! | non-terminal | `GameStateChanged(Gameplay)` | `Active` |
//! | `Active` | `GameStateChanged(other)` | `NotActive` |
//! | `NotActive` | `GameStateChanged(other)` | `NotActive` |
//!
//! Executing a `StartMission` command counts as a reset: a new mission
//! always begins from `NotActive` and waits for the host to report
//! gameplay.

use defusal_types::{BombEvent, BombSnapshot, Command, Phase};
use tracing::{debug, info};

use crate::host::{BombInfo, MissionCommands};

/// Authoritative bomb phase, owned by the simulation thread.
///
/// Module lists, strikes, and the timer live in the host; the store
/// reads them through [`BombInfo`] when a snapshot is captured.
#[derive(Debug, Default)]
pub struct StateStore {
    phase: Phase,
}

impl StateStore {
    /// Create a store in [`Phase::NotActive`].
    pub const fn new() -> Self {
        Self {
            phase: Phase::NotActive,
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Apply a host event. Returns `true` if the phase changed.
    pub fn observe(&mut self, event: BombEvent) -> bool {
        let next = match (self.phase, event) {
            (_, BombEvent::Reset) => Phase::NotActive,
            (current, _) if current.is_terminal() => current,
            (_, BombEvent::Exploded) => Phase::Exploded,
            (_, BombEvent::Solved) => Phase::Defused,
            (_, BombEvent::GameStateChanged(state)) if state.is_gameplay() => Phase::Active,
            (Phase::Active, BombEvent::GameStateChanged(_)) => Phase::NotActive,
            (current, BombEvent::GameStateChanged(_)) => current,
        };
        self.transition(next, event)
    }

    /// Return to [`Phase::NotActive`] regardless of the current phase.
    pub fn reset(&mut self) -> bool {
        self.observe(BombEvent::Reset)
    }

    /// Execute a command against the host.
    ///
    /// The host's success or failure is not observed. Strike counts and
    /// module lists are read back from the host on the next capture.
    pub fn execute<H>(&mut self, command: Command, host: &mut H)
    where
        H: MissionCommands + ?Sized,
    {
        match command {
            Command::StartMission { mission_id, seed } => {
                self.reset();
                info!(mission_id, seed, "Starting mission");
                host.start_mission(&mission_id, &seed);
            }
            Command::CauseStrike { reason } => {
                info!(reason, phase = %self.phase, "Causing strike");
                host.cause_strike(&reason);
            }
        }
    }

    /// Build a snapshot from the host's current state and this store's
    /// phase.
    pub fn capture<H>(&self, host: &H) -> BombSnapshot
    where
        H: BombInfo + ?Sized,
    {
        BombSnapshot {
            time: host.formatted_time(),
            strikes: host.strike_count(),
            modules: host.module_ids(),
            solvable_modules: host.solvable_module_ids(),
            solved_modules: host.solved_module_ids(),
            bomb_state: self.phase,
        }
    }

    fn transition(&mut self, next: Phase, event: BombEvent) -> bool {
        if next == self.phase {
            debug!(phase = %self.phase, ?event, "Event left phase unchanged");
            return false;
        }
        info!(from = %self.phase, to = %next, ?event, "Bomb phase changed");
        self.phase = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use defusal_types::GameState;

    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<String>,
        strikes: u32,
    }

    impl MissionCommands for RecordingHost {
        fn start_mission(&mut self, mission_id: &str, seed: &str) {
            self.calls.push(format!("start {mission_id} {seed}"));
        }

        fn cause_strike(&mut self, reason: &str) {
            self.calls.push(format!("strike {reason}"));
            self.strikes = self.strikes.saturating_add(1);
        }
    }

    impl BombInfo for RecordingHost {
        fn formatted_time(&self) -> String {
            String::from("01:00")
        }

        fn strike_count(&self) -> u32 {
            self.strikes
        }

        fn module_ids(&self) -> Vec<String> {
            vec![String::from("Wires"), String::from("Knob")]
        }

        fn solvable_module_ids(&self) -> Vec<String> {
            vec![String::from("Wires")]
        }

        fn solved_module_ids(&self) -> Vec<String> {
            Vec::new()
        }
    }

    const GAMEPLAY: BombEvent = BombEvent::GameStateChanged(GameState::Gameplay);
    const POST_GAME: BombEvent = BombEvent::GameStateChanged(GameState::PostGame);

    #[test]
    fn gameplay_activates_and_leaving_deactivates() {
        let mut store = StateStore::new();
        assert!(store.observe(GAMEPLAY));
        assert_eq!(store.phase(), Phase::Active);

        assert!(!store.observe(GAMEPLAY));
        assert_eq!(store.phase(), Phase::Active);

        assert!(store.observe(POST_GAME));
        assert_eq!(store.phase(), Phase::NotActive);
    }

    #[test]
    fn leaving_gameplay_while_inactive_is_ignored() {
        let mut store = StateStore::new();
        assert!(!store.observe(BombEvent::GameStateChanged(GameState::Setup)));
        assert_eq!(store.phase(), Phase::NotActive);
    }

    #[test]
    fn exploded_is_terminal_until_reset() {
        let mut store = StateStore::new();
        store.observe(GAMEPLAY);
        assert!(store.observe(BombEvent::Exploded));
        assert_eq!(store.phase(), Phase::Exploded);

        for event in [BombEvent::Solved, BombEvent::Exploded, GAMEPLAY, POST_GAME] {
            assert!(!store.observe(event));
            assert_eq!(store.phase(), Phase::Exploded);
        }

        assert!(store.reset());
        assert_eq!(store.phase(), Phase::NotActive);
    }

    #[test]
    fn solved_is_terminal_until_reset() {
        let mut store = StateStore::new();
        store.observe(GAMEPLAY);
        assert!(store.observe(BombEvent::Solved));
        assert_eq!(store.phase(), Phase::Defused);

        assert!(!store.observe(BombEvent::Exploded));
        assert!(!store.observe(POST_GAME));
        assert_eq!(store.phase(), Phase::Defused);
    }

    #[test]
    fn terminal_events_apply_without_prior_gameplay() {
        let mut store = StateStore::new();
        assert!(store.observe(BombEvent::Solved));
        assert_eq!(store.phase(), Phase::Defused);
    }

    #[test]
    fn start_mission_resets_and_delegates() {
        let mut store = StateStore::new();
        let mut host = RecordingHost::default();
        store.observe(BombEvent::Exploded);

        store.execute(Command::start_mission("mission1", "42"), &mut host);

        assert_eq!(store.phase(), Phase::NotActive);
        assert_eq!(host.calls, vec!["start mission1 42"]);
    }

    #[test]
    fn cause_strike_delegates_without_touching_phase() {
        let mut store = StateStore::new();
        let mut host = RecordingHost::default();
        store.observe(GAMEPLAY);

        store.execute(Command::cause_strike("wires"), &mut host);
        store.execute(Command::cause_strike("wires"), &mut host);

        assert_eq!(store.phase(), Phase::Active);
        assert_eq!(host.calls, vec!["strike wires", "strike wires"]);
        assert_eq!(host.strikes, 2);
    }

    #[test]
    fn capture_combines_host_state_and_phase() {
        let mut store = StateStore::new();
        let mut host = RecordingHost::default();
        store.observe(GAMEPLAY);
        store.execute(Command::cause_strike("x"), &mut host);

        let snap = store.capture(&host);
        assert_eq!(snap.time, "01:00");
        assert_eq!(snap.strikes, 1);
        assert_eq!(snap.modules, vec!["Wires", "Knob"]);
        assert_eq!(snap.solvable_modules, vec!["Wires"]);
        assert!(snap.solved_modules.is_empty());
        assert_eq!(snap.bomb_state, Phase::Active);
    }
}
