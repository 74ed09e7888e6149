use crate::effects::EffectType;

pub trait ItemOracle: Send + Sync {
    fn definition(&self, item_id: &str) -> Option<ItemDefinition>;
}

/// Consumable item as used from a combatant's inventory.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub effect: ItemEffect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemEffect {
    /// Restores up to `amount` HP on a conscious unit.
    Heal { amount: u32 },
    /// Brings a fainted unit back with `fraction` of its max HP.
    Revive { fraction: f64 },
    /// Removes one named status effect.
    CureStatus { effect: EffectType },
}

impl ItemEffect {
    /// True if the effect may target `unit` in its current state.
    pub fn applies_to(&self, unit: &crate::state::UnitState) -> bool {
        match self {
            ItemEffect::Heal { .. } => !unit.is_fainted && !unit.is_full_hp(),
            ItemEffect::Revive { .. } => unit.is_fainted,
            ItemEffect::CureStatus { .. } => !unit.is_fainted,
        }
    }
}
