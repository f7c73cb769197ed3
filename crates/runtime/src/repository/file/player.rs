//! File-based PlayerRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use essence_core::{PersistedRecord, PlayerId};

use crate::repository::{PlayerRepository, RepositoryError, Result};

/// Stores each player's record as `{player}.json` in one directory.
///
/// # File Format
///
/// ```json
/// {
///   "totalStormEssence": 1234.5,
///   "activePassives": ["STORM_RESISTANCE"]
/// }
/// ```
///
/// Missing fields load as zero or empty.
pub struct FilePlayerRepository {
    base_dir: PathBuf,
}

impl FilePlayerRepository {
    /// Create the repository, creating `base_dir` if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn record_path(&self, player: PlayerId) -> PathBuf {
        self.base_dir.join(format!("{player}.json"))
    }
}

impl PlayerRepository for FilePlayerRepository {
    fn save(&self, player: PlayerId, record: &PersistedRecord) -> Result<()> {
        let path = self.record_path(player);
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved player[{}] to {}", player, path.display());
        Ok(())
    }

    fn load(&self, player: PlayerId) -> Result<Option<PersistedRecord>> {
        let path = self.record_path(player);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let record: PersistedRecord = serde_json::from_str(&json)
            .map_err(|e| RepositoryError::Json(format!("{}: {}", path.display(), e)))?;
        if !record.total_storm_essence.is_finite() || record.total_storm_essence < 0.0 {
            return Err(RepositoryError::CorruptedData(format!(
                "{}: totalStormEssence is {}",
                path.display(),
                record.total_storm_essence
            )));
        }

        tracing::debug!("Loaded player[{}] from {}", player, path.display());
        Ok(Some(record))
    }

    fn exists(&self, player: PlayerId) -> bool {
        self.record_path(player).exists()
    }

    fn delete(&self, player: PlayerId) -> Result<()> {
        let path = self.record_path(player);
        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted player[{}]", player);
        }
        Ok(())
    }

    fn list_players(&self) -> Result<Vec<PlayerId>> {
        let mut players = Vec::new();
        for entry in fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)? {
            let path = entry.map_err(RepositoryError::Io)?.path();
            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(stem) = filename.strip_suffix(".json")
                && let Ok(player) = stem.parse::<PlayerId>()
            {
                players.push(player);
            }
        }
        players.sort_unstable();
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: PlayerId = PlayerId(0x1234_5678_9abc_def0_1234_5678_9abc_def0);

    fn record() -> PersistedRecord {
        PersistedRecord {
            total_storm_essence: 1250.0,
            active_passives: vec!["STORM_RESISTANCE".into(), "STORMBORN".into()],
        }
    }

    #[test]
    fn save_then_load_returns_same_record() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePlayerRepository::new(dir.path()).unwrap();

        repo.save(PLAYER, &record()).unwrap();

        assert!(repo.exists(PLAYER));
        assert_eq!(repo.load(PLAYER).unwrap(), Some(record()));
        assert!(!dir.path().join(format!("{PLAYER}.json.tmp")).exists());
    }

    #[test]
    fn file_uses_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePlayerRepository::new(dir.path()).unwrap();
        repo.save(PLAYER, &record()).unwrap();

        let json = fs::read_to_string(dir.path().join(format!("{PLAYER}.json"))).unwrap();
        assert!(json.contains("\"totalStormEssence\""));
        assert!(json.contains("\"activePassives\""));
    }

    #[test]
    fn missing_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePlayerRepository::new(dir.path()).unwrap();
        fs::write(dir.path().join(format!("{PLAYER}.json")), "{}").unwrap();

        assert_eq!(repo.load(PLAYER).unwrap(), Some(PersistedRecord::default()));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePlayerRepository::new(dir.path()).unwrap();
        fs::write(dir.path().join(format!("{PLAYER}.json")), "{not json").unwrap();

        assert!(matches!(repo.load(PLAYER), Err(RepositoryError::Json(_))));
    }

    #[test]
    fn negative_total_is_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePlayerRepository::new(dir.path()).unwrap();
        fs::write(
            dir.path().join(format!("{PLAYER}.json")),
            r#"{"totalStormEssence": -5}"#,
        )
        .unwrap();

        assert!(matches!(
            repo.load(PLAYER),
            Err(RepositoryError::CorruptedData(_))
        ));
    }

    #[test]
    fn list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FilePlayerRepository::new(dir.path()).unwrap();
        repo.save(PlayerId(2), &record()).unwrap();
        repo.save(PlayerId(1), &record()).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(repo.list_players().unwrap(), vec![PlayerId(1), PlayerId(2)]);

        repo.delete(PlayerId(1)).unwrap();
        repo.delete(PlayerId(1)).unwrap();
        assert_eq!(repo.list_players().unwrap(), vec![PlayerId(2)]);
        assert_eq!(repo.load(PlayerId(1)).unwrap(), None);
    }
}
