//! Active status effect instances on a unit.
//!
//! At most one instance per [`EffectType`]. The hooks that give effects their
//! meaning live in [`crate::effects`]; this module only stores instances.

use arrayvec::ArrayVec;

use super::Side;
use crate::config::BattleConfig;
use crate::effects::EffectType;

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

/// A single active effect.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: EffectType,
    /// Remaining turns. `None` lasts until cured.
    pub remaining: Option<u32>,
    pub magnitude: Option<f64>,
    pub applied_by: Side,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn has(&self, kind: EffectType) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn get(&self, kind: EffectType) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    pub fn get_mut(&mut self, kind: EffectType) -> Option<&mut StatusEffect> {
        self.effects.iter_mut().find(|e| e.kind == kind)
    }

    /// Appends a new instance. Returns false when the set is full.
    pub(crate) fn push(&mut self, effect: StatusEffect) -> bool {
        self.effects.try_push(effect).is_ok()
    }

    pub(crate) fn take(&mut self, kind: EffectType) -> Option<StatusEffect> {
        let position = self.effects.iter().position(|e| e.kind == kind)?;
        Some(self.effects.remove(position))
    }

    pub fn kinds(&self) -> impl Iterator<Item = EffectType> + '_ {
        self.effects.iter().map(|e| e.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
