//! Error types for the bridge binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and shutdown.

/// Top-level error for the bridge binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: defusal_core::config::ConfigError,
    },

    /// The listener failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: defusal_observer::startup::StartupError,
    },

    /// The simulation thread could not be started or did not exit
    /// cleanly.
    #[error("simulation error: {message}")]
    Simulation {
        /// Description of the failure.
        message: String,
    },

    /// The listener could not be shut down cleanly.
    #[error("shutdown error: {message}")]
    Shutdown {
        /// Description of the failure.
        message: String,
    },
}
