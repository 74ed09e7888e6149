//! Species catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};
use crate::species::SpeciesDefinition;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesCatalog {
    pub species: Vec<SpeciesDefinition>,
}

/// Loader for species templates from RON files.
pub struct SpeciesLoader;

impl SpeciesLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<SpeciesDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses a catalog and checks that ids are unique, every species has
    /// between one and four moves, and explicit effect magnitudes are
    /// positive.
    pub fn parse(content: &str) -> LoadResult<Vec<SpeciesDefinition>> {
        let catalog: SpeciesCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse species catalog RON: {}", e))?;

        let mut seen = std::collections::HashSet::new();
        for species in &catalog.species {
            if !seen.insert(species.id) {
                anyhow::bail!("Duplicate species id {} in catalog", species.id);
            }
            if species.moves.is_empty() || species.moves.len() > battle_core::BattleConfig::MAX_MOVES {
                anyhow::bail!(
                    "Species '{}' must know between 1 and {} moves, found {}",
                    species.name,
                    battle_core::BattleConfig::MAX_MOVES,
                    species.moves.len()
                );
            }
            for mv in &species.moves {
                for effect in &mv.effects {
                    if let Some(magnitude) = effect.magnitude.filter(|m| !(*m > 0.0 && m.is_finite())) {
                        anyhow::bail!(
                            "Move '{}' of species '{}' has {} magnitude {}, expected a positive value",
                            mv.id,
                            species.name,
                            effect.kind,
                            magnitude
                        );
                    }
                }
            }
        }

        Ok(catalog.species)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{EffectTarget, EffectType, MoveCategory};

    const CATALOG: &str = r#"(species: [
        (
            id: 7,
            name: "Ember",
            max_hp: 90,
            attack: 60,
            defense: 35,
            speed: 40,
            moves: [
                (id: "scorch", name: "Scorch", power: 35, category: damaging, effects: [
                    (kind: burn, chance: 0.3, target: enemy, duration: Some(3), magnitude: Some(6.0)),
                ]),
                (id: "rally", name: "Rally", power: 0, category: support, affinity: Some("fire"), effects: [
                    (kind: attackUp, chance: 1.0, target: self),
                ]),
            ],
        ),
    ])"#;

    #[test]
    fn parses_moves_and_effects() {
        let species = SpeciesLoader::parse(CATALOG).unwrap();
        let ember = &species[0];
        assert_eq!(ember.moves.len(), 2);

        let scorch = &ember.moves[0];
        assert_eq!(scorch.category, MoveCategory::Damaging);
        assert_eq!(scorch.effects[0].kind, EffectType::Burn);
        assert_eq!(scorch.effects[0].duration, Some(3));

        let rally = &ember.moves[1];
        assert_eq!(rally.affinity.as_deref(), Some("fire"));
        assert_eq!(rally.effects[0].target, EffectTarget::SelfUnit);
        assert_eq!(rally.effects[0].magnitude, None);
    }

    #[test]
    fn rejects_species_without_moves() {
        let err = SpeciesLoader::parse(
            r#"(species: [(id: 1, name: "Blank", max_hp: 10, attack: 1, defense: 1, speed: 1, moves: [])])"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Blank"));
    }

    #[test]
    fn rejects_non_positive_magnitudes() {
        for magnitude in ["0.0", "-1.5"] {
            let catalog = format!(
                r#"(species: [(id: 1, name: "Husk", max_hp: 10, attack: 1, defense: 1, speed: 1, moves: [
                    (id: "brace", name: "Brace", power: 0, category: support, effects: [
                        (kind: defenseUp, chance: 1.0, target: self, magnitude: Some({magnitude})),
                    ]),
                ])])"#
            );
            let err = SpeciesLoader::parse(&catalog).unwrap_err();
            assert!(err.to_string().contains("brace"), "{err}");
        }
    }
}
