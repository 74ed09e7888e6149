//! All battle content in one place.

use std::path::Path;

use battle_core::{BattleConfig, ItemDefinition, LocaleTable};

use crate::loaders::{
    BotLoader, BotProfile, ConfigLoader, ItemLoader, LoadResult, LocaleLoader, SpeciesLoader,
};
use crate::species::SpeciesDefinition;

const BUNDLED_ITEMS: &str = include_str!("../../data/items.ron");
const BUNDLED_SPECIES: &str = include_str!("../../data/species.ron");
const BUNDLED_BOTS: &str = include_str!("../../data/bots.ron");
const BUNDLED_CONFIG: &str = include_str!("../../data/battle.toml");
const BUNDLED_LOCALES: [&str; 2] = [
    include_str!("../../data/locales/en.ron"),
    include_str!("../../data/locales/pt-br.ron"),
];

/// Loaded and cross-checked content.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// ├── items.ron
/// ├── species.ron
/// ├── bots.ron
/// └── locales/
///     ├── en.ron
///     └── pt-br.ron
/// ```
#[derive(Clone, Debug)]
pub struct ContentBundle {
    pub items: Vec<ItemDefinition>,
    pub species: Vec<SpeciesDefinition>,
    pub bots: Vec<BotProfile>,
    pub locales: Vec<LocaleTable>,
    pub config: BattleConfig,
}

impl ContentBundle {
    /// Content compiled into this crate.
    pub fn bundled() -> LoadResult<Self> {
        let locales = BUNDLED_LOCALES
            .iter()
            .map(|content| LocaleLoader::parse(content))
            .collect::<LoadResult<Vec<_>>>()?;

        Self::assemble(
            ItemLoader::parse(BUNDLED_ITEMS)?,
            SpeciesLoader::parse(BUNDLED_SPECIES)?,
            BotLoader::parse(BUNDLED_BOTS)?,
            locales,
            ConfigLoader::parse(BUNDLED_CONFIG)?,
        )
    }

    /// Loads every file from `data_dir`. Every `*.ron` file under
    /// `locales/` becomes one table.
    pub fn load_dir(data_dir: &Path) -> LoadResult<Self> {
        let locales_dir = data_dir.join("locales");
        let mut locale_paths = std::fs::read_dir(&locales_dir)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", locales_dir.display(), e))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
            .collect::<Vec<_>>();
        locale_paths.sort();

        let locales = locale_paths
            .iter()
            .map(|path| LocaleLoader::load(path))
            .collect::<LoadResult<Vec<_>>>()?;

        Self::assemble(
            ItemLoader::load(&data_dir.join("items.ron"))?,
            SpeciesLoader::load(&data_dir.join("species.ron"))?,
            BotLoader::load(&data_dir.join("bots.ron"))?,
            locales,
            ConfigLoader::load(&data_dir.join("battle.toml"))?,
        )
    }

    fn assemble(
        items: Vec<ItemDefinition>,
        species: Vec<SpeciesDefinition>,
        bots: Vec<BotProfile>,
        locales: Vec<LocaleTable>,
        config: BattleConfig,
    ) -> LoadResult<Self> {
        let bundle = Self {
            items,
            species,
            bots,
            locales,
            config,
        };

        for bot in &bundle.bots {
            for member in &bot.party {
                if bundle.species(member.species).is_none() {
                    anyhow::bail!(
                        "Bot '{}' references unknown species {}",
                        bot.id,
                        member.species
                    );
                }
            }
            for item_id in bot.inventory.keys() {
                if bundle.item(item_id).is_none() {
                    anyhow::bail!("Bot '{}' carries unknown item '{}'", bot.id, item_id);
                }
            }
        }
        if bundle.locales.is_empty() {
            anyhow::bail!("At least one locale table is required");
        }

        Ok(bundle)
    }

    pub fn item(&self, item_id: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn species(&self, species_id: u32) -> Option<&SpeciesDefinition> {
        self.species.iter().find(|species| species.id == species_id)
    }

    pub fn bot(&self, bot_id: &str) -> Option<&BotProfile> {
        self.bots.iter().find(|bot| bot.id == bot_id)
    }

    pub fn locale(&self, lang: &str) -> Option<&LocaleTable> {
        self.locales.iter().find(|table| table.lang() == lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{EventKey, ItemEffect};
    use strum::IntoEnumIterator;

    #[test]
    fn bundled_content_is_consistent() {
        let bundle = ContentBundle::bundled().unwrap();

        assert_eq!(bundle.species.len(), 8);
        assert!(bundle.bot("jessie").is_some());
        assert!(bundle.bot("pro-james").is_some());
        assert_eq!(
            bundle.item("potion").map(|item| item.effect),
            Some(ItemEffect::Heal { amount: 30 })
        );
        assert_eq!(bundle.config, BattleConfig::default());
    }

    #[test]
    fn every_bundled_locale_covers_every_event() {
        let bundle = ContentBundle::bundled().unwrap();
        for table in &bundle.locales {
            let missing: Vec<EventKey> = EventKey::iter()
                .filter(|key| table.template(*key).is_none())
                .collect();
            assert!(missing.is_empty(), "{} is missing {:?}", table.lang(), missing);
        }
    }

    #[test]
    fn loads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        for name in ["items.ron", "species.ron", "bots.ron", "battle.toml"] {
            std::fs::copy(data.join(name), dir.path().join(name)).unwrap();
        }
        std::fs::create_dir(dir.path().join("locales")).unwrap();
        std::fs::copy(
            data.join("locales/en.ron"),
            dir.path().join("locales/en.ron"),
        )
        .unwrap();

        let bundle = ContentBundle::load_dir(dir.path()).unwrap();
        assert_eq!(bundle.locales.len(), 1);
        assert_eq!(bundle.locale("en").map(LocaleTable::lang), Some("en"));
        assert!(bundle.locale("pt-br").is_none());
    }

    #[test]
    fn dangling_species_reference_is_rejected() {
        let err = ContentBundle::assemble(
            Vec::new(),
            Vec::new(),
            BotLoader::parse(
                r#"(bots: [(id: "ghost", name: "Ghost", strategy: "random", party: [(species: 99, level: 1)])])"#,
            )
            .unwrap(),
            vec![LocaleTable::new("en")],
            BattleConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown species 99"));
    }
}
