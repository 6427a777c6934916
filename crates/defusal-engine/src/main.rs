//! Bridge binary for the Defusal simulation.
//!
//! Runs the HTTP listener against a headless [`DemoBomb`] so the bridge
//! can be exercised without a game. Clients start missions and cause
//! strikes over HTTP; the simulation thread applies them on its next
//! tick and publishes a fresh snapshot.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `defusal-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the bridge with the configured queue bound
//! 4. Start the listener on its dedicated thread
//! 5. Run the tick loop on the simulation thread
//! 6. Wait for Ctrl-C, SIGTERM, or the tick limit
//! 7. Stop the loop, then the listener

mod demo_bomb;
mod error;

use std::path::Path;
use std::sync::Arc;
use std::thread;

use defusal_core::SimulationBridge;
use defusal_core::config::{BridgeConfig, LogFormat, LoggingConfig};
use defusal_core::runner::{self, RunControl, SimulationResult};
use defusal_observer::ObserverServer;
use defusal_observer::startup::spawn_observer;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::demo_bomb::DemoBomb;
use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "defusal-config.yaml";

/// Name of the simulation thread.
const SIMULATION_THREAD_NAME: &str = "defusal-simulation";

/// Application entry point for the bridge.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the listener cannot
/// bind, or the simulation thread fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so report after.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("defusal-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        tick_interval_ms = config.simulation.tick_interval_ms,
        max_ticks = config.simulation.max_ticks,
        max_pending_commands = config.simulation.max_pending_commands,
        "Configuration loaded"
    );

    // 3. Create the bridge.
    let mut bridge =
        SimulationBridge::with_queue_capacity(config.simulation.max_pending_commands);

    // 4. Start the listener.
    let server = spawn_observer(&config.server, bridge.remote())
        .map_err(|source| EngineError::Observer { source })?;

    // 5. Run the tick loop.
    let control = Arc::new(RunControl::new(
        config.simulation.tick_interval_ms,
        config.simulation.max_ticks,
    ));
    let (done_tx, done_rx) = oneshot::channel::<()>();
    let sim_control = Arc::clone(&control);
    let sim_thread = thread::Builder::new()
        .name(SIMULATION_THREAD_NAME.to_owned())
        .spawn(move || {
            let mut bomb = DemoBomb::default();
            let result = runner::run_simulation(&mut bridge, &mut bomb, &sim_control);
            // The receiver is gone only if main is already shutting down.
            let _ = done_tx.send(());
            result
        })
        .map_err(|e| EngineError::Simulation {
            message: format!("cannot spawn simulation thread: {e}"),
        });
    let sim_thread = match sim_thread {
        Ok(handle) => handle,
        Err(e) => {
            stop_observer(server).await?;
            return Err(e.into());
        }
    };

    // 6. Wait for a signal or for the loop to end on its own.
    tokio::select! {
        () = shutdown_signal() => {}
        _ = done_rx => {
            info!("Simulation loop ended");
        }
    }

    // 7. Shut down.
    control.request_stop();
    let joined = tokio::task::spawn_blocking(move || sim_thread.join()).await;
    stop_observer(server).await?;
    let result = joined
        .map_err(|e| EngineError::Simulation {
            message: format!("join task failed: {e}"),
        })?
        .map_err(|_panic| EngineError::Simulation {
            message: String::from("simulation thread panicked"),
        })?;

    log_result(&result);
    Ok(())
}

/// Stop the listener on the blocking pool.
///
/// [`ObserverServer::stop`] joins the listener thread and can wait out
/// the whole grace period, which must not stall the async runtime.
async fn stop_observer(server: ObserverServer) -> Result<(), EngineError> {
    tokio::task::spawn_blocking(move || {
        let mut server = server;
        server.stop();
    })
    .await
    .map_err(|e| EngineError::Shutdown {
        message: format!("listener stop task failed: {e}"),
    })
}

/// Load configuration from [`CONFIG_PATH`].
///
/// Returns the configuration and whether it came from the file. A
/// missing file yields defaults with environment overrides applied.
fn load_config() -> Result<(BridgeConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = BridgeConfig::from_file(config_path)?;
        Ok((config, true))
    } else {
        let mut config = BridgeConfig::default();
        config.apply_env_overrides()?;
        Ok((config, false))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl-C, shutting down");
        }
        () = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}

fn log_result(result: &SimulationResult) {
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_phase = %result.final_phase,
        "defusal-engine shutdown complete"
    );
}
