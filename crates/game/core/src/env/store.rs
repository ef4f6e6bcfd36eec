//! Player record store consumed by the session.
//!
//! The core never persists anything itself. It reads a record, computes the full
//! next record, and hands it back through [`PlayerStore::upsert`] before any boss
//! state is committed.

use crate::state::PlayerRecord;

/// Failure reported by a [`PlayerStore`] implementation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("record for `{username}` is corrupted: {reason}")]
    Corrupted { username: String, reason: String },
}

/// Durable per-player record store keyed by normalized username.
pub trait PlayerStore {
    fn get(&self, username: &str) -> Result<Option<PlayerRecord>, StoreError>;

    /// Inserts or replaces the record for `record.username`.
    fn upsert(&self, record: &PlayerRecord) -> Result<(), StoreError>;

    /// Records ordered by XP descending. Ties keep username order.
    fn top_by_xp(&self, limit: usize) -> Result<Vec<PlayerRecord>, StoreError>;

    /// Usernames known to the store, used when no one has been active recently.
    fn known_usernames(&self, limit: usize) -> Result<Vec<String>, StoreError>;

    /// Records with boss damage dealt since `day_start_ms`, highest first.
    /// Ties keep username order.
    fn top_hitters_since(
        &self,
        day_start_ms: u64,
        limit: usize,
    ) -> Result<Vec<PlayerRecord>, StoreError>;

    /// Applies `update` to every record as one write and returns how many
    /// records there were. On error no record changes.
    fn update_all(&self, update: &mut dyn FnMut(&mut PlayerRecord)) -> Result<usize, StoreError>;
}

impl<S: PlayerStore + ?Sized> PlayerStore for &S {
    fn get(&self, username: &str) -> Result<Option<PlayerRecord>, StoreError> {
        (**self).get(username)
    }

    fn upsert(&self, record: &PlayerRecord) -> Result<(), StoreError> {
        (**self).upsert(record)
    }

    fn top_by_xp(&self, limit: usize) -> Result<Vec<PlayerRecord>, StoreError> {
        (**self).top_by_xp(limit)
    }

    fn known_usernames(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        (**self).known_usernames(limit)
    }

    fn top_hitters_since(
        &self,
        day_start_ms: u64,
        limit: usize,
    ) -> Result<Vec<PlayerRecord>, StoreError> {
        (**self).top_hitters_since(day_start_ms, limit)
    }

    fn update_all(&self, update: &mut dyn FnMut(&mut PlayerRecord)) -> Result<usize, StoreError> {
        (**self).update_all(update)
    }
}
