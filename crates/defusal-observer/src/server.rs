//! Listener lifecycle.
//!
//! [`ObserverServer`] owns the dedicated listener thread. [`start`]
//! binds on the caller's thread, so an unavailable address is reported
//! synchronously, then hands the socket to a thread named
//! `defusal-listener` that runs a current-thread Tokio runtime serving
//! the router. The runtime lives entirely on that thread; `start` waits
//! for it to report ready, so setup failures still come back as errors
//! even when `start` is called from async code. [`stop`] signals graceful shutdown, gives in-flight
//! requests [`ServerConfig::shutdown_grace`] to finish, abandons
//! whatever is left, and joins the thread. The socket is released by
//! the time `stop` returns.
//!
//! [`start`]: ObserverServer::start
//! [`stop`]: ObserverServer::stop

use std::net::SocketAddr;
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use axum::Router;
use defusal_core::BridgeRemote;
use defusal_core::config::ServerSettings;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Name of the listener thread.
pub const LISTENER_THREAD_NAME: &str = "defusal-listener";

/// Configuration for the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// The TCP port to listen on. Port 0 picks an ephemeral port.
    pub port: u16,
    /// How long [`ObserverServer::stop`] waits for in-flight requests.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&ServerSettings::default())
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            shutdown_grace: Duration::from_millis(settings.shutdown_grace_ms),
        }
    }
}

/// Errors that can occur when starting the listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// [`ObserverServer::start`] was called while already running.
    #[error("listener is already running")]
    AlreadyRunning,

    /// The runtime or listener thread could not be created.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// A started listener.
#[derive(Debug)]
struct Running {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    thread: JoinHandle<()>,
}

/// HTTP listener bound to a bridge.
///
/// Dropping a running server stops it.
#[derive(Debug)]
pub struct ObserverServer {
    config: ServerConfig,
    state: Arc<AppState>,
    running: Option<Running>,
}

impl ObserverServer {
    /// Create a stopped server for `remote`.
    pub fn new(config: ServerConfig, remote: BridgeRemote) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(remote)),
            running: None,
        }
    }

    /// Bind the configured address and start serving on the listener
    /// thread.
    ///
    /// Returns the bound address, which differs from the configured one
    /// when port 0 was requested.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRunning`] if the server is running,
    /// [`ServerError::Bind`] if the address cannot be bound, or
    /// [`ServerError::Runtime`] if the runtime or thread cannot be
    /// created.
    pub fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if self.running.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        let target = format!("{}:{}", self.config.host, self.config.port);
        let std_listener =
            std::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).map_err(|e| {
                ServerError::Bind(format!("bind failed on {target}: {e}"))
            })?;
        std_listener
            .set_nonblocking(true)
            .map_err(|e| ServerError::Bind(format!("cannot configure {target}: {e}")))?;
        let addr = std_listener
            .local_addr()
            .map_err(|e| ServerError::Bind(format!("no local address for {target}: {e}")))?;

        let router = build_router(Arc::clone(&self.state));
        let (shutdown, signal) = watch::channel(false);
        let (ready_tx, ready_rx) = mpsc::channel();
        let grace = self.config.shutdown_grace;

        let thread = thread::Builder::new()
            .name(LISTENER_THREAD_NAME.to_owned())
            .spawn(move || listen(std_listener, router, signal, grace, &ready_tx))
            .map_err(|e| ServerError::Runtime(format!("cannot spawn listener thread: {e}")))?;
        let thread = await_ready(&ready_rx, thread)?;

        info!(%addr, "Listener started");

        self.running = Some(Running {
            addr,
            shutdown,
            thread,
        });
        Ok(addr)
    }

    /// Stop serving and release the socket.
    ///
    /// Blocks until the listener thread has exited, which takes at most
    /// the shutdown grace period plus the time to unwind. A no-op if the
    /// server is not running.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        // Err only if the listener already exited on its own.
        let _ = running.shutdown.send(true);
        if running.thread.join().is_err() {
            error!(addr = %running.addr, "Listener thread panicked");
        }

        info!(addr = %running.addr, "Listener stopped");
    }

    /// The bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.addr)
    }

    /// Whether [`start`](Self::start) succeeded and [`stop`](Self::stop)
    /// has not been called since.
    pub const fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The listener configuration.
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl Drop for ObserverServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Outcome of listener setup, sent from the listener thread to `start`.
type Ready = Result<(), ServerError>;

/// Wait for the listener thread to report whether it is serving.
///
/// On failure the thread has already given up; it is joined before the
/// error is returned.
fn await_ready(
    ready: &mpsc::Receiver<Ready>,
    thread: JoinHandle<()>,
) -> Result<JoinHandle<()>, ServerError> {
    let failure = match ready.recv() {
        Ok(Ok(())) => return Ok(thread),
        Ok(Err(e)) => e,
        Err(_disconnected) => {
            ServerError::Runtime(String::from("listener thread exited during setup"))
        }
    };
    if thread.join().is_err() {
        error!("Listener thread panicked during setup");
    }
    Err(failure)
}

/// Entry point of the listener thread.
///
/// The runtime is built and dropped on this thread, never on the caller
/// of `start`, which may itself be inside a runtime.
fn listen(
    std_listener: std::net::TcpListener,
    router: Router,
    signal: watch::Receiver<bool>,
    grace: Duration,
    ready: &mpsc::Sender<Ready>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = ready.send(Err(ServerError::Runtime(format!("cannot build runtime: {e}"))));
            return;
        }
    };

    let registered = {
        let _guard = runtime.enter();
        TcpListener::from_std(std_listener)
    };
    let listener = match registered {
        Ok(listener) => listener,
        Err(e) => {
            let _ = ready.send(Err(ServerError::Bind(format!("cannot register listener: {e}"))));
            return;
        }
    };

    // Err only if `start` already gave up waiting.
    if ready.send(Ok(())).is_err() {
        return;
    }
    serve(&runtime, listener, router, signal, grace);
}

/// Serve until the shutdown flag flips, then lets open connections
/// drain for at most `grace`. Connection tasks still alive when this
/// returns are dropped with the runtime.
fn serve(
    runtime: &Runtime,
    listener: TcpListener,
    router: Router,
    signal: watch::Receiver<bool>,
    grace: Duration,
) {
    runtime.block_on(async move {
        let mut stop_accepting = signal.clone();
        let mut deadline_signal = signal;

        let server = axum::serve(listener, router).with_graceful_shutdown(async move {
            let _ = stop_accepting.wait_for(|stop| *stop).await;
        });
        let deadline = async move {
            let _ = deadline_signal.wait_for(|stop| *stop).await;
            tokio::time::sleep(grace).await;
        };

        tokio::select! {
            result = server.into_future() => {
                if let Err(e) = result {
                    error!(error = %e, "Listener exited with error");
                }
            }
            () = deadline => {
                warn!(
                    grace_ms = grace.as_millis(),
                    "Shutdown grace elapsed, abandoning in-flight requests"
                );
            }
        }
    });
}
