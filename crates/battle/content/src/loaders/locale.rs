//! Locale table loader.
//!
//! RON format:
//!
//! ```text
//! (
//!     lang: "en",
//!     messages: {
//!         "TURN_END": "Turn {turn} is over.",
//!     },
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use battle_core::{EventKey, LocaleTable};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Deserialize)]
struct LocaleFile {
    lang: String,
    messages: BTreeMap<String, String>,
}

/// Loader for message tables from RON files.
pub struct LocaleLoader;

impl LocaleLoader {
    pub fn load(path: &Path) -> LoadResult<LocaleTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses a table. Keys must name an [`EventKey`]; missing keys are
    /// allowed and render as a placeholder at translation time.
    pub fn parse(content: &str) -> LoadResult<LocaleTable> {
        let file: LocaleFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse locale RON: {}", e))?;

        let mut table = LocaleTable::new(file.lang);
        for (key, template) in file.messages {
            let key = EventKey::from_str(&key).map_err(|_| {
                anyhow::anyhow!("Unknown event key '{}' in locale '{}'", key, table.lang())
            })?;
            table.insert(key, template);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{EventPayload, Translator};

    #[test]
    fn parses_templates_by_event_key() {
        let table = LocaleLoader::parse(
            r#"(lang: "en", messages: { "TURN_END": "Turn {turn} is over." })"#,
        )
        .unwrap();

        let mut payload = EventPayload::new();
        payload.insert("turn", 2u32);
        assert_eq!(table.lang(), "en");
        assert_eq!(table.translate(EventKey::TurnEnd, &payload), "Turn 2 is over.");
    }

    #[test]
    fn unknown_keys_fail_loudly() {
        let err = LocaleLoader::parse(r#"(lang: "en", messages: { "TURN_BEGAN": "x" })"#).unwrap_err();
        assert!(err.to_string().contains("TURN_BEGAN"));
    }
}
