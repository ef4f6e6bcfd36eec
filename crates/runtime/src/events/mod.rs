//! Topic-based broadcast bus for runtime events.
//!
//! Viewers subscribe to [`Topic::State`] for snapshots with toast text;
//! services that need the raw session notices subscribe to [`Topic::Session`].

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::StateBroadcast;
