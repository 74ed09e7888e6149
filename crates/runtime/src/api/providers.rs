//! Roster provider abstraction.
//!
//! The coordinator asks a [`RosterProvider`] for each human combatant's party
//! and inventory at battle creation. Implementations may hit a database or a
//! remote profile service, hence the async interface.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use battle_content::SpeciesDefinition;
use battle_core::{BattleConfig, CombatantId, PlayerBattleState, UnitState};

use super::errors::{Result, RuntimeError};

/// A combatant's party and items as brought into a battle.
#[derive(Clone, Debug, PartialEq)]
pub struct Roster {
    pub units: Vec<UnitState>,
    pub inventory: BTreeMap<String, u32>,
}

impl Roster {
    pub fn new(units: Vec<UnitState>, inventory: BTreeMap<String, u32>) -> Self {
        Self { units, inventory }
    }

    /// Builds a roster from species templates at their base stats.
    pub fn from_species<'a>(
        species: impl IntoIterator<Item = &'a SpeciesDefinition>,
        inventory: BTreeMap<String, u32>,
    ) -> Self {
        Self {
            units: species.into_iter().map(SpeciesDefinition::unit).collect(),
            inventory,
        }
    }

    /// Battle-ready side state. Units past the party limit are dropped.
    pub fn into_side(mut self) -> PlayerBattleState {
        self.units.truncate(BattleConfig::MAX_PARTY_SIZE);
        PlayerBattleState::new(self.units, self.inventory)
    }
}

#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn roster(&self, combatant: CombatantId) -> Result<Roster>;
}

/// Fixed rosters keyed by combatant, with an optional fallback for anyone
/// not listed.
#[derive(Clone, Debug, Default)]
pub struct StaticRosterProvider {
    rosters: HashMap<CombatantId, Roster>,
    fallback: Option<Roster>,
}

impl StaticRosterProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roster(mut self, combatant: CombatantId, roster: Roster) -> Self {
        self.rosters.insert(combatant, roster);
        self
    }

    pub fn with_fallback(mut self, roster: Roster) -> Self {
        self.fallback = Some(roster);
        self
    }
}

#[async_trait]
impl RosterProvider for StaticRosterProvider {
    async fn roster(&self, combatant: CombatantId) -> Result<Roster> {
        self.rosters
            .get(&combatant)
            .or(self.fallback.as_ref())
            .filter(|roster| !roster.units.is_empty())
            .cloned()
            .ok_or(RuntimeError::RosterUnavailable(combatant))
    }
}
