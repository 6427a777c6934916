//! Shared type definitions for the Defusal simulation bridge.
//!
//! These types cross the boundary between the simulation thread and the
//! network thread, so every one of them is plain owned data: `Send`,
//! `Clone`, and free of references into host state. The wire-facing
//! types also derive `ts-rs` so web clients can consume generated
//! `TypeScript` bindings.
//!
//! # Modules
//!
//! - [`enums`] -- Bomb phase and host game-flow states
//! - [`command`] -- Mutations requested by clients, executed on the
//!   simulation thread
//! - [`event`] -- Collaborator events delivered to the state store
//! - [`snapshot`] -- The immutable bomb snapshot served to clients

pub mod command;
pub mod enums;
pub mod event;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use command::Command;
pub use enums::{GameState, Phase};
pub use event::BombEvent;
pub use snapshot::BombSnapshot;
