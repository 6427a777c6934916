//! The simulation-thread side of the bridge and its network-side
//! handle.
//!
//! [`SimulationBridge`] owns the [`StateStore`] and the
//! [`SnapshotPublisher`] and consumes the [`CommandQueue`]. It is not
//! `Clone` and is meant to live on the simulation thread. Everything the
//! network thread needs is in [`BridgeRemote`]: a producer handle to the
//! queue and a [`SnapshotReader`].
//!
//! A tick drains the queue, executes every command in order, and
//! publishes a fresh snapshot, so any read after the tick reflects all
//! commands applied in that tick or earlier.

use std::sync::Arc;

use defusal_types::{BombEvent, BombSnapshot, Command, Phase};
use tracing::{debug, trace};

use crate::host::{BombHost, BombInfo};
use crate::publisher::{SnapshotPublisher, SnapshotReader};
use crate::queue::{CommandQueue, QueueError};
use crate::store::StateStore;

/// What a single tick did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number that just ran (1-based).
    pub tick: u64,
    /// Commands drained and executed during the tick.
    pub commands_executed: usize,
    /// Phase after the tick.
    pub phase: Phase,
}

/// Simulation-side owner of bomb state, the publisher, and the queue
/// consumer.
#[derive(Debug)]
pub struct SimulationBridge {
    store: StateStore,
    queue: Arc<CommandQueue>,
    publisher: SnapshotPublisher,
    tick: u64,
}

impl SimulationBridge {
    /// Create a bridge with an unbounded command queue.
    pub fn new() -> Self {
        Self::with_queue(CommandQueue::new())
    }

    /// Create a bridge whose queue rejects commands past `capacity`
    /// (0 = unbounded).
    pub fn with_queue_capacity(capacity: usize) -> Self {
        Self::with_queue(CommandQueue::bounded(capacity))
    }

    fn with_queue(queue: CommandQueue) -> Self {
        Self {
            store: StateStore::new(),
            queue: Arc::new(queue),
            publisher: SnapshotPublisher::new(),
            tick: 0,
        }
    }

    /// Hand out a network-side handle.
    pub fn remote(&self) -> BridgeRemote {
        BridgeRemote {
            queue: Arc::clone(&self.queue),
            snapshots: self.publisher.reader(),
        }
    }

    /// The phase machine.
    pub const fn store(&self) -> &StateStore {
        &self.store
    }

    /// Ticks run so far.
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Apply a host event and publish the resulting state.
    ///
    /// Returns `true` if the phase changed.
    pub fn observe<H>(&mut self, event: BombEvent, host: &H) -> bool
    where
        H: BombInfo + ?Sized,
    {
        let changed = self.store.observe(event);
        self.publish(host);
        changed
    }

    /// Run one tick: drain and execute pending commands, then publish.
    pub fn tick<H>(&mut self, host: &mut H) -> TickReport
    where
        H: BombHost + ?Sized,
    {
        self.tick = self.tick.saturating_add(1);
        let commands = self.queue.drain_all();
        let commands_executed = commands.len();

        for command in commands {
            debug!(tick = self.tick, command = command.kind(), "Executing command");
            self.store.execute(command, host);
        }

        self.publish(&*host);

        let report = TickReport {
            tick: self.tick,
            commands_executed,
            phase: self.store.phase(),
        };
        trace!(?report, "Tick complete");
        report
    }

    /// Capture and publish a snapshot of the current state.
    pub fn publish<H>(&self, host: &H) -> Arc<BombSnapshot>
    where
        H: BombInfo + ?Sized,
    {
        self.publisher.publish(self.store.capture(host))
    }

    /// The snapshot most recently published.
    pub fn latest(&self) -> Arc<BombSnapshot> {
        self.publisher.latest()
    }
}

impl Default for SimulationBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Network-side handle: submit commands, read snapshots.
///
/// Cheap to clone and safe to use from any thread.
#[derive(Debug, Clone)]
pub struct BridgeRemote {
    queue: Arc<CommandQueue>,
    snapshots: SnapshotReader,
}

impl BridgeRemote {
    /// Queue a command for the next tick.
    ///
    /// Returns once the command is queued; it has not executed yet.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Rejected`] if the queue is bounded and full.
    pub fn submit(&self, command: Command) -> Result<usize, QueueError> {
        self.queue.enqueue(command)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<BombSnapshot> {
        self.snapshots.read()
    }

    /// Commands waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
