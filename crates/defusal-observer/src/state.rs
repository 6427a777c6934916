//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use defusal_core::BridgeRemote;
use defusal_types::{BombSnapshot, Command};

use crate::error::ObserverError;

/// State shared by every request handler.
///
/// Holds only the network-side handle of the bridge, so handlers can
/// read the latest snapshot and queue commands but never reach into
/// the simulation.
#[derive(Debug, Clone)]
pub struct AppState {
    remote: BridgeRemote,
}

impl AppState {
    /// Wrap a bridge handle.
    pub const fn new(remote: BridgeRemote) -> Self {
        Self { remote }
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<BombSnapshot> {
        self.remote.snapshot()
    }

    /// Queue a command for the next tick.
    ///
    /// Returns the number of commands now pending.
    pub fn submit(&self, command: Command) -> Result<usize, ObserverError> {
        Ok(self.remote.submit(command)?)
    }
}
