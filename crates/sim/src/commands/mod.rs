//! Command implementations for boss-sim
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod raid;
mod skill;

pub use raid::Raid;
pub use skill::Skill;
