//! Content loaders for reading battle data from files.
//!
//! Each loader reads one RON/TOML file. Loaders also expose `parse` so the
//! bundled data compiled into the crate goes through the same code path.

pub mod bots;
pub mod bundle;
pub mod config;
pub mod item;
pub mod locale;
pub mod species;

pub use bots::{BotLoader, BotProfile};
pub use bundle::ContentBundle;
pub use config::ConfigLoader;
pub use item::ItemLoader;
pub use locale::LocaleLoader;
pub use species::SpeciesLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
