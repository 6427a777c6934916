//! Headless bomb for running the bridge without a game attached.
//!
//! [`DemoBomb`] plays a simplified round: starting a mission arms a
//! bomb with a handful of modules drawn from a seeded RNG, each step
//! burns the countdown and may solve modules at random, and three
//! strikes or an empty timer blow it up. It reports lifecycle changes as
//! [`BombEvent`]s so the runner can feed them to the bridge.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use defusal_core::{BombInfo, MissionCommands, SteppedSimulation};
use defusal_types::{BombEvent, GameState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Modules that can be solved.
const SOLVABLE_POOL: &[&str] = &[
    "Wires",
    "The Button",
    "Keypad",
    "Simon Says",
    "Who's on First",
    "Memory",
    "Morse Code",
    "Complicated Wires",
    "Wire Sequences",
    "Maze",
    "Password",
];

/// Modules that demand attention but can never be solved.
const NEEDY_MODULES: &[&str] = &["Venting Gas", "Capacitor Discharge", "Knobs"];

/// Fewest solvable modules on a bomb.
const MIN_MODULES: usize = 3;

/// Most solvable modules on a bomb.
const MAX_MODULES: usize = 6;

/// Chance that a bomb also carries one needy module.
const NEEDY_CHANCE: f64 = 0.5;

/// Strikes that detonate the bomb.
pub const STRIKE_LIMIT: u32 = 3;

/// Countdown a new bomb starts with.
pub const COUNTDOWN: Duration = Duration::from_secs(300);

/// Default chance that an unsolved module is solved on a given step.
pub const DEFAULT_SOLVE_CHANCE: f64 = 0.02;

/// Where the current round is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Mission accepted; the next step reports the transition.
    Loading,
    /// Transition reported; the next step starts gameplay.
    Transitioning,
    /// Timer running.
    Armed,
    /// Defused or detonated; the next step reports the post-game screen.
    Finished,
    /// Round over.
    PostGame,
}

/// A bomb in play.
#[derive(Debug)]
struct Bomb {
    mission_id: String,
    modules: Vec<String>,
    solved: Vec<String>,
    remaining: Duration,
    strikes: u32,
    stage: Stage,
}

impl Bomb {
    fn solvable(&self) -> impl Iterator<Item = &String> {
        self.modules
            .iter()
            .filter(|m| !NEEDY_MODULES.contains(&m.as_str()))
    }

    fn all_solved(&self) -> bool {
        self.solvable().all(|m| self.solved.contains(m))
    }
}

/// Headless [`SteppedSimulation`] host.
#[derive(Debug)]
pub struct DemoBomb {
    rng: StdRng,
    solve_chance: f64,
    bomb: Option<Bomb>,
}

impl DemoBomb {
    /// Create an idle host. `solve_chance` outside `0.0..=1.0` falls back
    /// to [`DEFAULT_SOLVE_CHANCE`].
    pub fn new(solve_chance: f64) -> Self {
        let solve_chance = if (0.0..=1.0).contains(&solve_chance) {
            solve_chance
        } else {
            DEFAULT_SOLVE_CHANCE
        };
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
            solve_chance,
            bomb: None,
        }
    }
}

impl Default for DemoBomb {
    fn default() -> Self {
        Self::new(DEFAULT_SOLVE_CHANCE)
    }
}

/// Turn a mission seed into an RNG seed. Numeric seeds are used as-is.
fn seed_value(seed: &str) -> u64 {
    seed.trim().parse().unwrap_or_else(|_not_numeric| {
        let mut hasher = DefaultHasher::new();
        seed.hash(&mut hasher);
        hasher.finish()
    })
}

/// Draw a module list: solvable modules by partial Fisher-Yates shuffle
/// of the pool, then possibly one needy module.
fn pick_modules<R: Rng>(rng: &mut R) -> Vec<String> {
    let pool_len = SOLVABLE_POOL.len();
    let count = rng.random_range(MIN_MODULES..=MAX_MODULES).min(pool_len);

    let mut indices: Vec<usize> = (0..pool_len).collect();
    for i in 0..count {
        let j = rng.random_range(i..pool_len);
        indices.swap(i, j);
    }

    let mut modules: Vec<String> = indices
        .iter()
        .take(count)
        .filter_map(|&idx| SOLVABLE_POOL.get(idx))
        .map(|name| String::from(*name))
        .collect();

    if rng.random_bool(NEEDY_CHANCE) {
        let idx = rng.random_range(0..NEEDY_MODULES.len());
        if let Some(name) = NEEDY_MODULES.get(idx) {
            modules.push(String::from(*name));
        }
    }

    modules
}

/// Render a countdown as `MM:SS`.
pub fn format_clock(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

impl BombInfo for DemoBomb {
    fn formatted_time(&self) -> String {
        self.bomb
            .as_ref()
            .map(|b| format_clock(b.remaining))
            .unwrap_or_default()
    }

    fn strike_count(&self) -> u32 {
        self.bomb.as_ref().map_or(0, |b| b.strikes)
    }

    fn module_ids(&self) -> Vec<String> {
        self.bomb
            .as_ref()
            .map(|b| b.modules.clone())
            .unwrap_or_default()
    }

    fn solvable_module_ids(&self) -> Vec<String> {
        self.bomb
            .as_ref()
            .map(|b| b.solvable().cloned().collect())
            .unwrap_or_default()
    }

    fn solved_module_ids(&self) -> Vec<String> {
        self.bomb
            .as_ref()
            .map(|b| b.solved.clone())
            .unwrap_or_default()
    }
}

impl MissionCommands for DemoBomb {
    fn start_mission(&mut self, mission_id: &str, seed: &str) {
        if !seed.is_empty() {
            self.rng = StdRng::seed_from_u64(seed_value(seed));
        }
        let modules = pick_modules(&mut self.rng);
        info!(mission_id, seed, module_count = modules.len(), "Demo bomb armed");

        self.bomb = Some(Bomb {
            mission_id: mission_id.to_owned(),
            modules,
            solved: Vec::new(),
            remaining: COUNTDOWN,
            strikes: 0,
            stage: Stage::Loading,
        });
    }

    fn cause_strike(&mut self, reason: &str) {
        match self.bomb.as_mut() {
            Some(bomb) if bomb.stage == Stage::Armed => {
                bomb.strikes = bomb.strikes.saturating_add(1);
                info!(reason, strikes = bomb.strikes, "Strike");
            }
            _ => debug!(reason, "Strike ignored, no armed bomb"),
        }
    }
}

impl SteppedSimulation for DemoBomb {
    fn step(&mut self, dt: Duration) -> Vec<BombEvent> {
        let Self {
            rng,
            solve_chance,
            bomb,
        } = self;
        let Some(bomb) = bomb.as_mut() else {
            return Vec::new();
        };

        match bomb.stage {
            Stage::Loading => {
                bomb.stage = Stage::Transitioning;
                vec![BombEvent::GameStateChanged(GameState::Transitioning)]
            }
            Stage::Transitioning => {
                bomb.stage = Stage::Armed;
                vec![BombEvent::GameStateChanged(GameState::Gameplay)]
            }
            Stage::Armed => {
                if bomb.strikes >= STRIKE_LIMIT {
                    info!(
                        mission_id = bomb.mission_id,
                        strikes = bomb.strikes,
                        "Demo bomb struck out"
                    );
                    bomb.stage = Stage::Finished;
                    return vec![BombEvent::Exploded];
                }

                bomb.remaining = bomb.remaining.saturating_sub(dt);

                let newly_solved: Vec<String> = bomb
                    .solvable()
                    .filter(|m| !bomb.solved.contains(m))
                    .filter(|_| rng.random_bool(*solve_chance))
                    .cloned()
                    .collect();
                for module in newly_solved {
                    debug!(module, "Module solved");
                    bomb.solved.push(module);
                }

                if bomb.all_solved() {
                    info!(mission_id = bomb.mission_id, "Demo bomb defused");
                    bomb.stage = Stage::Finished;
                    vec![BombEvent::Solved]
                } else if bomb.remaining.is_zero() {
                    info!(mission_id = bomb.mission_id, "Demo bomb timer ran out");
                    bomb.stage = Stage::Finished;
                    vec![BombEvent::Exploded]
                } else {
                    Vec::new()
                }
            }
            Stage::Finished => {
                bomb.stage = Stage::PostGame;
                vec![BombEvent::GameStateChanged(GameState::PostGame)]
            }
            Stage::PostGame => Vec::new(),
        }
    }
}
