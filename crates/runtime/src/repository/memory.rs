//! In-memory player store for tests, simulations and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use boss_core::state::rank_hitters;
use boss_core::{PlayerRecord, PlayerStore, StoreError};

use super::{RepositoryError, rank_by_xp};

/// Player records keyed by normalized username.
#[derive(Debug, Default)]
pub struct InMemoryPlayerStore {
    rows: RwLock<BTreeMap<String, PlayerRecord>>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing records.
    pub fn with_records(records: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| (record.username.clone(), record))
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlayerStore for InMemoryPlayerStore {
    fn get(&self, username: &str) -> Result<Option<PlayerRecord>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rows.get(username).cloned())
    }

    fn upsert(&self, record: &PlayerRecord) -> Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        rows.insert(record.username.clone(), record.clone());
        Ok(())
    }

    fn top_by_xp(&self, limit: usize) -> Result<Vec<PlayerRecord>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rank_by_xp(&rows, limit))
    }

    fn known_usernames(&self, limit: usize) -> Result<Vec<String>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rows.keys().take(limit).cloned().collect())
    }

    fn top_hitters_since(
        &self,
        day_start_ms: u64,
        limit: usize,
    ) -> Result<Vec<PlayerRecord>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rank_hitters(rows.values(), day_start_ms, limit))
    }

    fn update_all(&self, update: &mut dyn FnMut(&mut PlayerRecord)) -> Result<usize, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        rows.values_mut().for_each(|record| update(record));
        Ok(rows.len())
    }
}
