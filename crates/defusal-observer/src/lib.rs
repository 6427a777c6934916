//! HTTP listener for the Defusal bridge.
//!
//! This crate exposes the running bomb to external clients over plain
//! HTTP:
//!
//! - **`bombInfo`** returns the latest [`BombSnapshot`] as JSON
//! - **`startMission`** enqueues a mission start
//! - **`causeStrike`** enqueues a strike
//!
//! Routing is by substring of the request path, so `/bombInfo`,
//! `/api/bombInfo` and `/bombInfoXYZ` all read state. Anything else gets
//! an empty 200.
//!
//! # Architecture
//!
//! The listener runs on its own OS thread hosting a current-thread Tokio
//! runtime (see [`ObserverServer`]). Handlers never touch simulation
//! state: reads come from the published snapshot and writes are queued
//! for the simulation thread's next tick via
//! [`BridgeRemote`](defusal_core::BridgeRemote).
//!
//! [`BombSnapshot`]: defusal_types::BombSnapshot

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::{QueryParams, Route, build_router, resolve};
pub use server::{ObserverServer, ServerConfig, ServerError};
pub use state::AppState;
