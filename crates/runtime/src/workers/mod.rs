//! Worker tasks that back the runtime orchestration.
//!
//! The game worker is the single owner of the session; the ticker only feeds
//! it periodic `Tick` commands.

mod game;
mod ticker;

pub use game::{Command, GameWorker};
pub use ticker::Ticker;
