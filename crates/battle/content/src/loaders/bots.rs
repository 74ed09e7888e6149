//! Bot profile loader.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};
use crate::species::PartyMember;

/// An authored AI opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotProfile {
    pub id: String,
    pub name: String,
    /// Strategy id resolved through `battle_core::strategy_for`.
    pub strategy: String,
    pub party: Vec<PartyMember>,
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotCatalog {
    pub bots: Vec<BotProfile>,
}

/// Loader for bot profiles from RON files.
pub struct BotLoader;

impl BotLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<BotProfile>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<BotProfile>> {
        let catalog: BotCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse bot catalog RON: {}", e))?;

        for bot in &catalog.bots {
            if bot.party.is_empty() || bot.party.len() > battle_core::BattleConfig::MAX_PARTY_SIZE {
                anyhow::bail!(
                    "Bot '{}' must field between 1 and {} units, found {}",
                    bot.id,
                    battle_core::BattleConfig::MAX_PARTY_SIZE,
                    bot.party.len()
                );
            }
            if battle_core::strategy_for(&bot.strategy).is_none() {
                anyhow::bail!("Bot '{}' uses unknown strategy '{}'", bot.id, bot.strategy);
            }
        }

        Ok(catalog.bots)
    }
}
