//! Platform-specific directory utilities.

use std::path::PathBuf;

const APP_NAME: &str = "pet-arena";

/// Log directory, following platform cache conventions.
///
/// - macOS: `~/Library/Caches/pet-arena/logs`
/// - Linux: `~/.cache/pet-arena/logs` (or `$XDG_CACHE_HOME/pet-arena/logs`)
/// - Windows: `%LOCALAPPDATA%\pet-arena\logs`
/// - Fallback: `/tmp/pet-arena/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp").join(APP_NAME))
        .join("logs")
}

/// Directory holding finished battle records.
///
/// Fallback: `./arena_data/records`
pub fn records_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./arena_data"))
        .join("records")
}
