//! Player store implementations.
//!
//! Both stores keep every record in memory behind a lock; the file store also
//! writes the full table to disk on each upsert.

mod error;
mod file;
mod memory;

pub use error::{RepositoryError, Result};
pub use file::FilePlayerStore;
pub use memory::InMemoryPlayerStore;

use std::collections::BTreeMap;

use boss_core::PlayerRecord;

/// Highest XP first, ties broken by username.
pub(crate) fn rank_by_xp(rows: &BTreeMap<String, PlayerRecord>, limit: usize) -> Vec<PlayerRecord> {
    let mut ranked: Vec<PlayerRecord> = rows.values().cloned().collect();
    ranked.sort_by(|a, b| b.xp.cmp(&a.xp).then_with(|| a.username.cmp(&b.username)));
    ranked.truncate(limit);
    ranked
}
