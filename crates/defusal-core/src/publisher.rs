//! Latest-snapshot cell shared between the simulation and network
//! threads.
//!
//! The simulation thread owns the [`SnapshotPublisher`] and replaces the
//! visible snapshot wholesale after every state-affecting event. Network
//! handlers hold [`SnapshotReader`]s and get an `Arc` to whatever was
//! published last. A reader never sees a half-built snapshot: the value
//! is constructed before it is swapped in, and a reader that still holds
//! an older `Arc` keeps a valid, unchanged copy.
//!
//! The cell is a [`tokio::sync::watch`] channel. Publishing and reading
//! are both synchronous and only hold the channel's internal lock for a
//! pointer swap or clone, so neither side waits on the other for longer
//! than that.

use std::sync::Arc;

use defusal_types::BombSnapshot;
use tokio::sync::watch;

/// A published snapshot together with its publish sequence number.
#[derive(Debug, Clone)]
struct Published {
    /// Number of publishes before and including this one (0 = initial).
    version: u64,
    /// The snapshot itself.
    snapshot: Arc<BombSnapshot>,
}

/// Simulation-side writer of the latest snapshot.
#[derive(Debug)]
pub struct SnapshotPublisher {
    tx: watch::Sender<Published>,
}

impl SnapshotPublisher {
    /// Create a publisher whose initial value is
    /// [`BombSnapshot::not_started`].
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Published {
            version: 0,
            snapshot: Arc::new(BombSnapshot::not_started()),
        });
        Self { tx }
    }

    /// Atomically replace the visible snapshot.
    ///
    /// Returns the shared handle that readers will now observe.
    pub fn publish(&self, snapshot: BombSnapshot) -> Arc<BombSnapshot> {
        let snapshot = Arc::new(snapshot);
        let version = self.tx.borrow().version.saturating_add(1);
        self.tx.send_replace(Published {
            version,
            snapshot: Arc::clone(&snapshot),
        });
        snapshot
    }

    /// Hand out a reader for the network thread.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
        }
    }

    /// The snapshot most recently published (or the initial one).
    pub fn latest(&self) -> Arc<BombSnapshot> {
        Arc::clone(&self.tx.borrow().snapshot)
    }

    /// Number of publishes so far.
    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Network-side reader of the latest snapshot.
///
/// Cheap to clone; every clone observes the same publisher.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Published>,
}

impl SnapshotReader {
    /// The most recently published snapshot.
    ///
    /// Returns the initial "not started" snapshot if nothing has been
    /// published yet, and keeps returning the last snapshot after the
    /// publisher is dropped.
    pub fn read(&self) -> Arc<BombSnapshot> {
        Arc::clone(&self.rx.borrow().snapshot)
    }

    /// Number of publishes visible to this reader.
    pub fn version(&self) -> u64 {
        self.rx.borrow().version
    }
}
