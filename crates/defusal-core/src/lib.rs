//! Simulation-side half of the Defusal bridge.
//!
//! The simulation is single-threaded and tick-driven. The network side
//! never touches its state directly: reads go through immutable
//! snapshots, writes go through a command queue drained once per tick.
//!
//! # Modules
//!
//! - [`queue`] -- [`CommandQueue`], the multi-producer FIFO of pending
//!   commands.
//! - [`publisher`] -- [`SnapshotPublisher`] and [`SnapshotReader`], the
//!   single-writer / multi-reader latest-snapshot cell.
//! - [`host`] -- Collaborator traits the host simulation implements.
//! - [`store`] -- [`StateStore`], the bomb phase machine and command
//!   dispatcher.
//! - [`bridge`] -- [`SimulationBridge`], which ties the three together
//!   on the simulation thread, and [`BridgeRemote`] for the network side.
//! - [`runner`] -- Fixed-rate loop for headless hosts.
//! - [`config`] -- YAML configuration.
//!
//! [`CommandQueue`]: queue::CommandQueue
//! [`SnapshotPublisher`]: publisher::SnapshotPublisher
//! [`SnapshotReader`]: publisher::SnapshotReader
//! [`StateStore`]: store::StateStore
//! [`SimulationBridge`]: bridge::SimulationBridge
//! [`BridgeRemote`]: bridge::BridgeRemote

pub mod bridge;
pub mod config;
pub mod host;
pub mod publisher;
pub mod queue;
pub mod runner;
pub mod store;

pub use bridge::{BridgeRemote, SimulationBridge, TickReport};
pub use host::{BombHost, BombInfo, MissionCommands, SteppedSimulation};
pub use publisher::{SnapshotPublisher, SnapshotReader};
pub use queue::{CommandQueue, QueueError};
pub use store::StateStore;
