//! File-backed player store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use boss_core::state::rank_hitters;
use boss_core::{PlayerRecord, PlayerStore, StoreError};

use super::{RepositoryError, Result, rank_by_xp};

const PLAYERS_FILE: &str = "players.bin";

/// Player table persisted as a single bincode file.
///
/// The whole table is loaded on open and rewritten on every write through a
/// temp file and an atomic rename. A failed write leaves both the file and the
/// in-memory table unchanged.
///
/// Writes block on the filesystem. The runtime calls the store only from the
/// game worker, which runs on tokio's blocking pool.
#[derive(Debug)]
pub struct FilePlayerStore {
    path: PathBuf,
    rows: RwLock<BTreeMap<String, PlayerRecord>>,
}

impl FilePlayerStore {
    /// Opens (or creates) the store under `base_dir`.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)?;
        let path = base_dir.join(PLAYERS_FILE);

        let rows = if path.exists() {
            let bytes = fs::read(&path)?;
            bincode::deserialize(&bytes)
                .map_err(|e| RepositoryError::CorruptedData(format!("{}: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(
            path = %path.display(),
            players = rows.len(),
            "opened player store"
        );
        Ok(Self {
            path,
            rows: RwLock::new(rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, rows: &BTreeMap<String, PlayerRecord>) -> Result<()> {
        let temp_path = self.path.with_extension("bin.tmp");
        let bytes =
            bincode::serialize(rows).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl PlayerStore for FilePlayerStore {
    fn get(&self, username: &str) -> std::result::Result<Option<PlayerRecord>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rows.get(username).cloned())
    }

    fn upsert(&self, record: &PlayerRecord) -> std::result::Result<(), StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut next = rows.clone();
        next.insert(record.username.clone(), record.clone());
        self.persist(&next)?;
        *rows = next;
        Ok(())
    }

    fn top_by_xp(&self, limit: usize) -> std::result::Result<Vec<PlayerRecord>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rank_by_xp(&rows, limit))
    }

    fn known_usernames(&self, limit: usize) -> std::result::Result<Vec<String>, StoreError> {
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
    ) -> std::result::Result<Vec<PlayerRecord>, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rank_hitters(rows.values(), day_start_ms, limit))
    }

    fn update_all(
        &self,
        update: &mut dyn FnMut(&mut PlayerRecord),
    ) -> std::result::Result<usize, StoreError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut next = rows.clone();
        next.values_mut().for_each(|record| update(record));
        self.persist(&next)?;
        let count = next.len();
        *rows = next;
        Ok(count)
    }
}
