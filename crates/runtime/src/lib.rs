//! Runtime orchestration for the boss-fight simulation.
//!
//! This crate wires the pure [`boss_core::GameSession`] to a clock, a player
//! store and a broadcast bus. Consumers embed [`Runtime`] and talk to the game
//! through the cloneable [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based broadcast bus
//! - [`repository`] provides player store implementations
//! - [`clock`] and [`config`] supply time and environment settings
//! - `workers` keeps the game worker and ticker internal to the crate
pub mod api;
pub mod clock;
pub mod config;
pub mod events;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RuntimeConfig;
pub use events::{Event, EventBus, StateBroadcast, Topic};
pub use repository::{FilePlayerStore, InMemoryPlayerStore, RepositoryError};
pub use runtime::{Runtime, RuntimeBuilder};
