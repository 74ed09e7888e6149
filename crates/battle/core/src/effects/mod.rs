//! Status effect engine.
//!
//! Applies, removes, and ticks named status effects on a single unit through
//! the static registry in [`registry`]. Every operation narrates what it did
//! into a notification buffer and recomputes `can_act`.
mod kind;
mod registry;

pub use kind::{EffectCategories, EffectType};
pub use registry::{EffectDefinition, ModifierHook, TurnEndHook, TurnEndTick, definition};

use crate::event::{EventKey, Notification};
use crate::state::{Side, StatusEffect, UnitState};

/// Result of [`apply_effect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Already present: duration refreshed, `on_apply` not invoked again.
    Refreshed,
    /// Not a storable effect, the unit is fainted, or the effect set is full.
    Ignored,
}

/// Applies `kind` to `unit`.
///
/// If an instance of the same type is already active only its duration is
/// refreshed. Otherwise the instance is appended and its `on_apply` hook runs.
pub fn apply_effect(
    unit: &mut UnitState,
    kind: EffectType,
    duration: Option<u32>,
    magnitude: Option<f64>,
    applied_by: Side,
    notes: &mut Vec<Notification>,
) -> ApplyOutcome {
    let Some(def) = definition(kind) else {
        return ApplyOutcome::Ignored;
    };
    if unit.is_fainted {
        return ApplyOutcome::Ignored;
    }

    let remaining = duration.or(def.default_duration);

    if let Some(existing) = unit.status_effects.get_mut(kind) {
        existing.remaining = remaining;
        notes.push(
            Notification::broadcast(EventKey::StatusRefreshed)
                .with("unit", unit.display_name.as_str())
                .with("effect", kind.name()),
        );
        return ApplyOutcome::Refreshed;
    }

    let instance = StatusEffect {
        kind,
        remaining,
        magnitude,
        applied_by,
    };
    if !unit.status_effects.push(instance) {
        tracing::warn!(
            target: "battle::effects",
            unit = unit.id,
            effect = %kind,
            "status effect set full, dropping effect"
        );
        return ApplyOutcome::Ignored;
    }

    if let Some(hook) = def.on_apply {
        hook(unit, magnitude.unwrap_or(def.default_magnitude));
    }
    unit.refresh_can_act();

    notes.push(
        Notification::broadcast(EventKey::StatusApplied)
            .with("unit", unit.display_name.as_str())
            .with("effect", kind.name()),
    );
    ApplyOutcome::Applied
}

/// Removes `kind` from `unit`, running its `on_remove` hook.
///
/// Returns false (and emits nothing) if the effect was not active.
pub fn remove_effect(unit: &mut UnitState, kind: EffectType, notes: &mut Vec<Notification>) -> bool {
    let Some(instance) = unit.status_effects.take(kind) else {
        return false;
    };
    finish_removal(unit, instance, notes);
    unit.refresh_can_act();
    true
}

/// Ticks every effect on `unit` once.
///
/// Finite durations are decremented first; an effect reaching zero is
/// removed through `on_remove`, any other effect runs `on_turn_end`.
/// Fainted units are not ticked.
pub fn process_turn_end(unit: &mut UnitState, notes: &mut Vec<Notification>) {
    if unit.is_fainted {
        return;
    }

    let kinds: Vec<EffectType> = unit.status_effects.kinds().collect();
    for kind in kinds {
        let Some(instance) = unit.status_effects.get_mut(kind) else {
            continue;
        };

        let expired = match instance.remaining.as_mut() {
            Some(turns) => {
                *turns = turns.saturating_sub(1);
                *turns == 0
            }
            None => false,
        };
        let magnitude = instance.magnitude;

        if expired {
            if let Some(instance) = unit.status_effects.take(kind) {
                finish_removal(unit, instance, notes);
            }
            continue;
        }

        let Some(def) = definition(kind) else {
            continue;
        };
        if let Some(hook) = def.on_turn_end {
            let tick = hook(unit, magnitude.unwrap_or(def.default_magnitude));
            if tick.damage > 0 {
                notes.push(
                    Notification::broadcast(EventKey::StatusDamage)
                        .with("unit", unit.display_name.as_str())
                        .with("effect", kind.name())
                        .with("damage", tick.damage),
                );
            }
        }
    }

    unit.refresh_can_act();
}

/// True if any active effect on `unit` belongs to `category`.
pub fn has_category(unit: &UnitState, category: EffectCategories) -> bool {
    unit.status_effects
        .kinds()
        .any(|kind| kind.categories().intersects(category))
}

fn finish_removal(unit: &mut UnitState, instance: StatusEffect, notes: &mut Vec<Notification>) {
    if let Some(def) = definition(instance.kind)
        && let Some(hook) = def.on_remove
    {
        hook(unit, instance.magnitude.unwrap_or(def.default_magnitude));
    }
    notes.push(
        Notification::broadcast(EventKey::StatusRemoved)
            .with("unit", unit.display_name.as_str())
            .with("effect", instance.kind.name()),
    );
}
