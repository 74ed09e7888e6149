//! Runtime wrappers around static battle content.
//!
//! [`OracleManager`] bundles the item catalog, the active locale table, the
//! tuning, and the species/bot catalogs so the coordinator can build a
//! [`battle_core::BattleEnv`] per step. The data is immutable at runtime;
//! dynamic state lives in repositories.
mod items;

use std::sync::Arc;

use battle_content::{BotProfile, ContentBundle, SpeciesDefinition};
use battle_core::{BattleConfig, BattleEnv, LocaleTable};

pub use items::ItemOracleImpl;

const FALLBACK_LOCALE: &str = "en";

/// Manages all oracle implementations and provides unified access
#[derive(Clone)]
pub struct OracleManager {
    items: Arc<ItemOracleImpl>,
    locale: Arc<LocaleTable>,
    config: Arc<BattleConfig>,
    content: Arc<ContentBundle>,
}

impl OracleManager {
    /// Builds oracles over `content`, rendering messages in `locale`.
    ///
    /// Falls back to English, then to the first bundled table, when the
    /// requested language is not available.
    pub fn from_content(content: ContentBundle, locale: &str) -> Self {
        let table = content
            .locale(locale)
            .or_else(|| {
                tracing::warn!(
                    target: "runtime::oracle",
                    requested = locale,
                    fallback = FALLBACK_LOCALE,
                    "locale not bundled, falling back"
                );
                content.locale(FALLBACK_LOCALE)
            })
            .or_else(|| content.locales.first())
            .cloned()
            .unwrap_or_else(|| LocaleTable::new(locale));

        Self {
            items: Arc::new(ItemOracleImpl::from_definitions(content.items.iter().cloned())),
            locale: Arc::new(table),
            config: Arc::new(content.config.clone()),
            content: Arc::new(content),
        }
    }

    /// Read-only collaborators for one engine step.
    pub fn env(&self) -> BattleEnv<'_> {
        BattleEnv::new(self.items.as_ref(), self.locale.as_ref(), self.config.as_ref())
    }

    pub fn items(&self) -> &ItemOracleImpl {
        &self.items
    }

    pub fn locale(&self) -> &LocaleTable {
        &self.locale
    }

    pub fn bot_profile(&self, id: &str) -> Option<&BotProfile> {
        self.content.bot(id)
    }

    pub fn species(&self, id: u32) -> Option<&SpeciesDefinition> {
        self.content.species(id)
    }

    pub fn content(&self) -> &ContentBundle {
        &self.content
    }
}
