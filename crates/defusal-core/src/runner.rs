//! Fixed-rate simulation loop for headless hosts.
//!
//! [`run_simulation`] drives a [`SteppedSimulation`] on the calling
//! thread, which becomes the simulation thread. Each iteration:
//!
//! 1. Check for a stop request.
//! 2. Step the host and feed its events to the bridge.
//! 3. Tick the bridge (drain commands, execute, publish).
//! 4. Check the tick limit.
//! 5. Sleep for the remainder of the tick interval.
//!
//! [`RunControl`] is shared (behind an `Arc`) with whatever needs to stop
//! the loop or change its speed, such as a signal handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use defusal_types::Phase;
use tracing::info;

use crate::bridge::SimulationBridge;
use crate::host::SteppedSimulation;

/// Smallest tick interval; shorter configured intervals are raised to
/// this.
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// [`RunControl::request_stop`] was called.
    Stopped,
    /// The configured tick limit was reached.
    TickLimit,
}

/// Outcome of a [`run_simulation`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Why the loop ended.
    pub end_reason: EndReason,
    /// Ticks executed by this call.
    pub total_ticks: u64,
    /// Bomb phase when the loop ended.
    pub final_phase: Phase,
}

/// Shared controls for a running loop.
#[derive(Debug)]
pub struct RunControl {
    stop_requested: AtomicBool,
    tick_interval: Duration,
    /// Maximum ticks before the loop ends (0 = unlimited).
    max_ticks: u64,
}

impl RunControl {
    /// Create controls with the given interval and tick limit
    /// (0 = unlimited). Intervals below [`MIN_TICK_INTERVAL_MS`] are
    /// raised to it.
    pub const fn new(tick_interval_ms: u64, max_ticks: u64) -> Self {
        let tick_interval_ms = if tick_interval_ms < MIN_TICK_INTERVAL_MS {
            MIN_TICK_INTERVAL_MS
        } else {
            tick_interval_ms
        };
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval: Duration::from_millis(tick_interval_ms),
            max_ticks,
        }
    }

    /// Ask the loop to stop before its next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Real time per tick, also passed to the host as its step.
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Whether `tick` has reached the limit.
    pub const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }
}

/// Run the loop on the current thread until stopped or the tick limit
/// is reached.
pub fn run_simulation<S>(
    bridge: &mut SimulationBridge,
    sim: &mut S,
    control: &RunControl,
) -> SimulationResult
where
    S: SteppedSimulation + ?Sized,
{
    let mut total_ticks: u64 = 0;

    info!(
        tick_interval_ms = u64::try_from(control.tick_interval().as_millis()).unwrap_or(u64::MAX),
        max_ticks = control.max_ticks(),
        "Simulation loop starting"
    );

    loop {
        if control.is_stop_requested() {
            info!(total_ticks, "Stop requested");
            return finish(EndReason::Stopped, total_ticks, bridge);
        }

        let started = Instant::now();
        let interval = control.tick_interval();

        for event in sim.step(interval) {
            bridge.observe(event, &*sim);
        }
        let report = bridge.tick(sim);
        total_ticks = total_ticks.saturating_add(1);

        if control.tick_limit_reached(report.tick) {
            info!(tick = report.tick, max_ticks = control.max_ticks(), "Tick limit reached");
            return finish(EndReason::TickLimit, total_ticks, bridge);
        }

        let remaining = interval.saturating_sub(started.elapsed());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

fn finish(end_reason: EndReason, total_ticks: u64, bridge: &SimulationBridge) -> SimulationResult {
    let result = SimulationResult {
        end_reason,
        total_ticks,
        final_phase: bridge.store().phase(),
    };
    info!(
        reason = ?result.end_reason,
        total_ticks,
        final_phase = %result.final_phase,
        "Simulation loop ended"
    );
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use defusal_types::{BombEvent, Command, GameState};

    use super::*;
    use crate::host::{BombInfo, MissionCommands};

    /// Solves the bomb on the third step after a mission starts.
    #[derive(Default)]
    struct ScriptedBomb {
        steps_since_start: Option<u32>,
        strikes: u32,
        elapsed: Duration,
    }

    impl BombInfo for ScriptedBomb {
        fn formatted_time(&self) -> String {
            String::from("00:10")
        }
        fn strike_count(&self) -> u32 {
            self.strikes
        }
        fn module_ids(&self) -> Vec<String> {
            vec![String::from("Wires")]
        }
        fn solvable_module_ids(&self) -> Vec<String> {
            vec![String::from("Wires")]
        }
        fn solved_module_ids(&self) -> Vec<String> {
            Vec::new()
        }
    }

    impl MissionCommands for ScriptedBomb {
        fn start_mission(&mut self, _mission_id: &str, _seed: &str) {
            self.steps_since_start = Some(0);
        }
        fn cause_strike(&mut self, _reason: &str) {
            self.strikes = self.strikes.saturating_add(1);
        }
    }

    impl SteppedSimulation for ScriptedBomb {
        fn step(&mut self, dt: Duration) -> Vec<BombEvent> {
            self.elapsed = self.elapsed.saturating_add(dt);
            let Some(steps) = self.steps_since_start.as_mut() else {
                return Vec::new();
            };
            *steps = steps.saturating_add(1);
            match *steps {
                1 => vec![BombEvent::GameStateChanged(GameState::Gameplay)],
                3 => vec![BombEvent::Solved],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn stops_at_tick_limit() {
        let mut bridge = SimulationBridge::new();
        let mut bomb = ScriptedBomb::default();
        let control = RunControl::new(0, 5);

        let result = run_simulation(&mut bridge, &mut bomb, &control);
        assert_eq!(result.end_reason, EndReason::TickLimit);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(bridge.tick_count(), 5);
    }

    #[test]
    fn stops_when_requested() {
        let mut bridge = SimulationBridge::new();
        let mut bomb = ScriptedBomb::default();
        let control = RunControl::new(0, 0);
        control.request_stop();

        let result = run_simulation(&mut bridge, &mut bomb, &control);
        assert_eq!(result.end_reason, EndReason::Stopped);
        assert_eq!(result.total_ticks, 0);
    }

    #[test]
    fn stop_from_another_thread_ends_loop() {
        let control = Arc::new(RunControl::new(MIN_TICK_INTERVAL_MS, 0));
        let stopper = Arc::clone(&control);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            stopper.request_stop();
        });

        let mut bridge = SimulationBridge::new();
        let mut bomb = ScriptedBomb::default();
        let result = run_simulation(&mut bridge, &mut bomb, &control);
        handle.join().unwrap();

        assert_eq!(result.end_reason, EndReason::Stopped);
        assert!(result.total_ticks > 0);
    }

    #[test]
    fn commands_and_events_flow_through_loop() {
        let mut bridge = SimulationBridge::new();
        let remote = bridge.remote();
        let mut bomb = ScriptedBomb::default();

        remote.submit(Command::start_mission("mission1", "42")).unwrap();
        remote.submit(Command::cause_strike("wires")).unwrap();

        // Tick 1 executes the commands; steps 1 and 3 after that raise
        // gameplay and solved.
        let control = RunControl::new(0, 4);
        let result = run_simulation(&mut bridge, &mut bomb, &control);

        assert_eq!(result.final_phase, Phase::Defused);
        let snap = remote.snapshot();
        assert_eq!(snap.bomb_state, Phase::Defused);
        assert_eq!(snap.strikes, 1);
    }

    #[test]
    fn zero_interval_is_raised_to_minimum() {
        let min = Duration::from_millis(MIN_TICK_INTERVAL_MS);
        assert_eq!(RunControl::new(0, 0).tick_interval(), min);
        assert_eq!(RunControl::new(1, 0).tick_interval(), min);
        assert_eq!(RunControl::new(250, 0).tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn zero_interval_config_still_advances_host_time() {
        let mut bridge = SimulationBridge::new();
        let mut bomb = ScriptedBomb::default();
        let control = RunControl::new(0, 3);

        run_simulation(&mut bridge, &mut bomb, &control);

        let expected = Duration::from_millis(MIN_TICK_INTERVAL_MS).saturating_mul(3);
        assert_eq!(bomb.elapsed, expected);
    }

    #[test]
    fn zero_tick_limit_is_unlimited() {
        let control = RunControl::new(100, 0);
        assert!(!control.tick_limit_reached(u64::MAX));
    }
}
