//! Listener startup helper for embedding in a host binary.
//!
//! # Usage
//!
//! ```rust,ignore
//! use defusal_core::SimulationBridge;
//! use defusal_core::config::BridgeConfig;
//! use defusal_observer::startup::spawn_observer;
//!
//! let config = BridgeConfig::default();
//! let bridge = SimulationBridge::new();
//! let server = spawn_observer(&config.server, bridge.remote())?;
//! // Serving until `server` is stopped or dropped.
//! ```

use defusal_core::BridgeRemote;
use defusal_core::config::ServerSettings;

use crate::server::{ObserverServer, ServerConfig, ServerError};

/// Errors that can occur when spawning the listener.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Build a listener from loaded settings and start it.
///
/// The returned server is already running; hold it for as long as the
/// bridge should be reachable.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address cannot be bound or
/// the listener thread cannot be started.
pub fn spawn_observer(
    settings: &ServerSettings,
    remote: BridgeRemote,
) -> Result<ObserverServer, StartupError> {
    let mut server = ObserverServer::new(ServerConfig::from(settings), remote);
    let addr = server.start()?;

    tracing::info!(
        %addr,
        port = addr.port(),
        "Listener spawned on dedicated thread"
    );

    Ok(server)
}
