//! Repository contract for player records.

use essence_core::{PersistedRecord, PlayerId};

use super::Result;

/// Storage for the persisted part of player records, keyed by player.
///
/// Implementations are called from the essence worker and must not block for
/// long; a failed call is logged by the caller and never retried.
pub trait PlayerRepository: Send + Sync {
    /// Save (create or overwrite) a player's record.
    fn save(&self, player: PlayerId, record: &PersistedRecord) -> Result<()>;

    /// Load a player's record, `None` if it was never saved.
    fn load(&self, player: PlayerId) -> Result<Option<PersistedRecord>>;

    fn exists(&self, player: PlayerId) -> bool;

    fn delete(&self, player: PlayerId) -> Result<()>;

    /// Every player with a saved record, sorted.
    fn list_players(&self) -> Result<Vec<PlayerId>> {
        Ok(vec![])
    }
}
