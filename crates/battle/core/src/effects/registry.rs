//! Static effect registry.
//!
//! Each stored effect type maps to a category set, defaults, and optional
//! hooks invoked when the effect is applied, removed, or ticks at turn end.

use super::{EffectCategories, EffectType};
use crate::state::UnitState;

/// HP change reported by a turn-end hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnEndTick {
    pub damage: u32,
}

pub type ModifierHook = fn(&mut UnitState, f64);
pub type TurnEndHook = fn(&mut UnitState, f64) -> TurnEndTick;

#[derive(Clone, Copy, Debug)]
pub struct EffectDefinition {
    pub kind: EffectType,
    pub categories: EffectCategories,
    /// Duration used when a move does not specify one. `None` lasts until
    /// cured.
    pub default_duration: Option<u32>,
    pub default_magnitude: f64,
    pub on_apply: Option<ModifierHook>,
    pub on_remove: Option<ModifierHook>,
    pub on_turn_end: Option<TurnEndHook>,
}

static REGISTRY: [EffectDefinition; 6] = [
    EffectDefinition {
        kind: EffectType::Burn,
        categories: EffectCategories::OVER_TIME,
        default_duration: None,
        default_magnitude: 0.0,
        on_apply: None,
        on_remove: None,
        on_turn_end: Some(damage_over_time),
    },
    EffectDefinition {
        kind: EffectType::Poison,
        categories: EffectCategories::OVER_TIME,
        default_duration: None,
        default_magnitude: 10.0,
        on_apply: None,
        on_remove: None,
        on_turn_end: Some(damage_over_time),
    },
    // Blocking effects always expire so a battle where both sides are held
    // still moves forward.
    EffectDefinition {
        kind: EffectType::Sleep,
        categories: EffectCategories::BLOCKING,
        default_duration: Some(2),
        default_magnitude: 0.0,
        on_apply: None,
        on_remove: None,
        on_turn_end: None,
    },
    EffectDefinition {
        kind: EffectType::Freeze,
        categories: EffectCategories::BLOCKING,
        default_duration: Some(2),
        default_magnitude: 0.0,
        on_apply: None,
        on_remove: None,
        on_turn_end: None,
    },
    EffectDefinition {
        kind: EffectType::AttackUp,
        categories: EffectCategories::MODIFIER,
        default_duration: None,
        default_magnitude: 1.5,
        on_apply: Some(scale_attack),
        on_remove: Some(unscale_attack),
        on_turn_end: None,
    },
    EffectDefinition {
        kind: EffectType::DefenseUp,
        categories: EffectCategories::MODIFIER,
        default_duration: None,
        default_magnitude: 1.5,
        on_apply: Some(scale_defense),
        on_remove: Some(unscale_defense),
        on_turn_end: None,
    },
];

/// Looks up the registry entry for a stored effect type.
pub fn definition(kind: EffectType) -> Option<&'static EffectDefinition> {
    REGISTRY.iter().find(|def| def.kind == kind)
}

fn damage_over_time(unit: &mut UnitState, magnitude: f64) -> TurnEndTick {
    let amount = magnitude.max(0.0).floor() as u32;
    TurnEndTick {
        damage: unit.take_damage(amount),
    }
}

fn scale_attack(unit: &mut UnitState, magnitude: f64) {
    unit.modifiers.attack_modifier *= magnitude;
}

fn unscale_attack(unit: &mut UnitState, magnitude: f64) {
    if magnitude != 0.0 {
        unit.modifiers.attack_modifier /= magnitude;
    }
}

fn scale_defense(unit: &mut UnitState, magnitude: f64) {
    unit.modifiers.defense_modifier *= magnitude;
}

fn unscale_defense(unit: &mut UnitState, magnitude: f64) {
    if magnitude != 0.0 {
        unit.modifiers.defense_modifier /= magnitude;
    }
}
