//! Platform-specific directories for logs and saved data.
use std::path::PathBuf;

const APP_NAME: &str = "storm-essence";

/// Log directory, e.g. `~/.cache/storm-essence/logs` on Linux.
///
/// Falls back to `/tmp/storm-essence/logs`.
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp").join(APP_NAME))
        .join("logs")
}

/// Data directory holding `config.toml` and `players/`.
///
/// Falls back to `./essence_data`.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./essence_data"))
}
