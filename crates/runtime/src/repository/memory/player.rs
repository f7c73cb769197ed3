//! In-memory PlayerRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use essence_core::{PersistedRecord, PlayerId};

use crate::repository::{PlayerRepository, RepositoryError, Result};

#[derive(Default)]
pub struct InMemoryPlayerRepo {
    records: RwLock<HashMap<PlayerId, PersistedRecord>>,
}

impl InMemoryPlayerRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with records already present.
    pub fn with_records(records: impl IntoIterator<Item = (PlayerId, PersistedRecord)>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }
}

impl PlayerRepository for InMemoryPlayerRepo {
    fn save(&self, player: PlayerId, record: &PersistedRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.insert(player, record.clone());
        Ok(())
    }

    fn load(&self, player: PlayerId) -> Result<Option<PersistedRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(&player).cloned())
    }

    fn exists(&self, player: PlayerId) -> bool {
        self.records
            .read()
            .map(|records| records.contains_key(&player))
            .unwrap_or(false)
    }

    fn delete(&self, player: PlayerId) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.remove(&player);
        Ok(())
    }

    fn list_players(&self) -> Result<Vec<PlayerId>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut players: Vec<PlayerId> = records.keys().copied().collect();
        players.sort_unstable();
        Ok(players)
    }
}
