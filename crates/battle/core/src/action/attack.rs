//! Attack resolution: hit roll, damage formula, crit/block, faint, effects.

use super::HandlerOutcome;
use crate::effects::{EffectType, apply_effect};
use crate::env::{BattleEnv, RngOracle};
use crate::event::{EventKey, Notification};
use crate::state::{BattleSession, EffectTarget, MoveCategory, Side, UnitState};

pub(super) fn attack(
    session: &mut BattleSession,
    env: &BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    side: Side,
    move_id: &str,
    ally_index: Option<usize>,
) -> HandlerOutcome {
    let actor = session.combatant(side);
    let config = env.config();
    let mut notes = Vec::new();

    let Some(attacker) = session.side(side).active() else {
        notes.push(Notification::to(EventKey::NoActiveUnit, actor));
        return HandlerOutcome::held(notes);
    };
    let Some(mv) = attacker.find_move(move_id).cloned() else {
        notes.push(Notification::to(EventKey::InvalidMove, actor).with("move", move_id));
        return HandlerOutcome::held(notes);
    };
    let attacker_name = attacker.display_name.clone();
    let defender_side = side.other();

    let mut dealt = 0;
    match mv.category {
        MoveCategory::Damaging => {
            let (Some(attacker), Some(defender)) = (
                session.side(side).active(),
                session
                    .side(defender_side)
                    .active()
                    .filter(|unit| !unit.is_fainted),
            ) else {
                notes.push(
                    Notification::broadcast(EventKey::AttackNoTarget)
                        .with("attacker", attacker_name.as_str())
                        .with("move", mv.name.as_str()),
                );
                return HandlerOutcome::advanced(notes);
            };

            if rng.roll() < defender.modifiers.dodge_chance
                || rng.roll() >= attacker.modifiers.hit_chance
            {
                notes.push(
                    Notification::broadcast(EventKey::AttackMiss)
                        .with("attacker", attacker_name.as_str())
                        .with("defender", defender.display_name.as_str())
                        .with("move", mv.name.as_str()),
                );
                return HandlerOutcome::advanced(notes);
            }

            let offense = f64::from(attacker.attack) * attacker.modifiers.attack_modifier;
            let defense =
                (f64::from(defender.defense) * defender.modifiers.defense_modifier).max(1.0);
            let mut damage = f64::from(mv.power) * (offense / defense) * config.damage_constant;

            let crit = rng.roll() < attacker.modifiers.crit_chance;
            if crit {
                damage *= config.crit_multiplier;
            }
            let blocked = rng.roll() < defender.modifiers.block_chance;
            if blocked {
                damage *= config.block_multiplier;
            }
            let amount = (damage.floor() as u32).max(1);

            let Some(defender) = session.side_mut(defender_side).active_mut() else {
                return HandlerOutcome::advanced(notes);
            };
            dealt = defender.take_damage(amount);
            let defender_name = defender.display_name.clone();
            let fainted = defender.mark_fainted_if_down();

            notes.push(
                Notification::broadcast(EventKey::AttackHit)
                    .with("attacker", attacker_name.as_str())
                    .with("defender", defender_name.as_str())
                    .with("move", mv.name.as_str())
                    .with("damage", dealt),
            );
            if crit {
                notes.push(
                    Notification::broadcast(EventKey::AttackCrit)
                        .with("attacker", attacker_name.as_str()),
                );
            }
            if blocked {
                notes.push(
                    Notification::broadcast(EventKey::AttackBlocked)
                        .with("defender", defender_name.as_str()),
                );
            }
            if fainted {
                notes.push(
                    Notification::broadcast(EventKey::UnitFainted)
                        .with("unit", defender_name.as_str()),
                );
            }
        }
        MoveCategory::Support => {
            notes.push(
                Notification::broadcast(EventKey::MoveUsed)
                    .with("unit", attacker_name.as_str())
                    .with("move", mv.name.as_str()),
            );
        }
    }

    for effect in &mv.effects {
        if rng.roll() >= effect.chance {
            continue;
        }

        if effect.kind == EffectType::Lifesteal {
            let fraction = effect.magnitude.unwrap_or(config.lifesteal_fraction);
            let amount = (f64::from(dealt) * fraction).floor() as u32;
            if let Some(attacker) = session.side_mut(side).active_mut()
                && !attacker.is_fainted
            {
                let healed = attacker.restore_hp(amount);
                if healed > 0 {
                    notes.push(
                        Notification::broadcast(EventKey::LifestealHeal)
                            .with("unit", attacker.display_name.as_str())
                            .with("amount", healed),
                    );
                }
            }
            continue;
        }

        let target: Option<&mut UnitState> = match effect.target {
            EffectTarget::SelfUnit => session.side_mut(side).active_mut(),
            EffectTarget::Enemy => session.side_mut(defender_side).active_mut(),
            EffectTarget::Ally => {
                ally_index.and_then(|index| session.side_mut(side).unit_mut(index))
            }
        };
        if let Some(unit) = target {
            apply_effect(
                unit,
                effect.kind,
                effect.duration,
                effect.magnitude,
                side,
                &mut notes,
            );
        }
    }

    HandlerOutcome::advanced(notes)
}
