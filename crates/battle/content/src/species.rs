//! Unit templates.
//!
//! A species is the authored definition a [`UnitState`] is instantiated
//! from. Bot parties reference species by id together with a level; stats
//! scale by `1 + (level - 1) * 0.1`, floored.

use battle_core::{Move, UnitState};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesDefinition {
    pub id: u32,
    pub name: String,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub moves: Vec<Move>,
}

impl SpeciesDefinition {
    /// Fresh unit with the authored stats and name.
    pub fn unit(&self) -> UnitState {
        UnitState::new(
            self.id,
            self.name.clone(),
            self.max_hp,
            self.attack,
            self.defense,
            self.speed,
            self.moves.iter().cloned(),
        )
    }

    /// Fresh unit scaled to `level`, named `"<name> (Lv <level>)"`.
    pub fn unit_at_level(&self, level: u32) -> UnitState {
        let level = level.max(1);
        UnitState::new(
            self.id,
            format!("{} (Lv {level})", self.name),
            scale(self.max_hp, level),
            scale(self.attack, level),
            scale(self.defense, level),
            scale(self.speed, level),
            self.moves.iter().cloned(),
        )
    }
}

/// Stat multiplier for `level`.
pub fn level_multiplier(level: u32) -> f64 {
    1.0 + f64::from(level.saturating_sub(1)) * 0.1
}

// Integer form of floor(stat * level_multiplier(level)); avoids float drift.
fn scale(stat: u32, level: u32) -> u32 {
    let tenths = 10 + u64::from(level.saturating_sub(1));
    let scaled = u64::from(stat) * tenths / 10;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// One slot of an authored party.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartyMember {
    pub species: u32,
    pub level: u32,
}
