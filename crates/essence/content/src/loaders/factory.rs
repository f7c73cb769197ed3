//! Content factory resolving data files from a data directory.

use std::path::{Path, PathBuf};

use essence_core::EssenceConfig;

use crate::loaders::{ConfigLoader, LoadResult};

/// Loads engine content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── players/
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "config.toml";
    pub const PLAYERS_DIR: &'static str = "players";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<EssenceConfig> {
        ConfigLoader::load(&self.config_path())
    }

    /// Like [`Self::load_config`], but a missing file yields the defaults.
    ///
    /// A file that exists and fails to parse is still an error.
    pub fn load_config_or_default(&self) -> LoadResult<EssenceConfig> {
        let path = self.config_path();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(EssenceConfig::default());
        }
        ConfigLoader::load(&path)
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(Self::CONFIG_FILE)
    }

    /// Directory holding one JSON record per player.
    pub fn players_dir(&self) -> PathBuf {
        self.data_dir.join(Self::PLAYERS_DIR)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
