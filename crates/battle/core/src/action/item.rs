use super::HandlerOutcome;
use crate::effects::remove_effect;
use crate::env::{BattleEnv, ItemEffect};
use crate::event::{EventKey, Notification};
use crate::state::{BattleSession, Side};

pub(super) fn use_item(
    session: &mut BattleSession,
    env: &BattleEnv<'_>,
    side: Side,
    item_id: &str,
    target: Option<usize>,
) -> HandlerOutcome {
    let actor = session.combatant(side);

    let Some(definition) = env.items().definition(item_id) else {
        return HandlerOutcome::held(vec![
            Notification::to(EventKey::ItemUnknown, actor).with("item", item_id),
        ]);
    };

    let state = session.side_mut(side);
    let Some(index) = target.or(state.active_index) else {
        return HandlerOutcome::held(vec![Notification::to(EventKey::NoActiveUnit, actor)]);
    };
    let applicable = state
        .unit(index)
        .is_some_and(|unit| definition.effect.applies_to(unit));
    if !applicable {
        return HandlerOutcome::held(vec![
            Notification::to(EventKey::ItemNotApplicable, actor)
                .with("item", definition.name.as_str()),
        ]);
    }
    if !state.take_item(item_id) {
        return HandlerOutcome::held(vec![
            Notification::to(EventKey::ItemNotOwned, actor).with("item", definition.name.as_str()),
        ]);
    }
    state.has_used_item_this_turn = true;

    let mut notes = Vec::new();
    let Some(unit) = state.unit_mut(index) else {
        return HandlerOutcome::advanced(notes);
    };

    match definition.effect {
        ItemEffect::Heal { amount } => {
            let healed = unit.restore_hp(amount);
            notes.push(
                Notification::broadcast(EventKey::ItemHeal)
                    .with("player", actor)
                    .with("item", definition.name.as_str())
                    .with("unit", unit.display_name.as_str())
                    .with("amount", healed),
            );
        }
        ItemEffect::Revive { fraction } => {
            let hp = ((f64::from(unit.max_hp) * fraction).floor() as u32).max(1);
            unit.revive(hp);
            notes.push(
                Notification::broadcast(EventKey::ItemRevive)
                    .with("player", actor)
                    .with("item", definition.name.as_str())
                    .with("unit", unit.display_name.as_str())
                    .with("hp", unit.current_hp),
            );
        }
        ItemEffect::CureStatus { effect } => {
            if remove_effect(unit, effect, &mut notes) {
                notes.push(
                    Notification::broadcast(EventKey::ItemCure)
                        .with("player", actor)
                        .with("item", definition.name.as_str())
                        .with("unit", unit.display_name.as_str())
                        .with("effect", effect.name()),
                );
            } else {
                notes.push(
                    Notification::broadcast(EventKey::ItemCureNoEffect)
                        .with("player", actor)
                        .with("item", definition.name.as_str())
                        .with("unit", unit.display_name.as_str()),
                );
            }
        }
    }

    HandlerOutcome::advanced(notes)
}

#[cfg(test)]
mod tests {
    use crate::action::test_support::*;
    use crate::action::{Action, HandlerOutcome, execute};
    use crate::effects::{EffectType, apply_effect};
    use crate::env::{BattleEnv, SequenceRng};
    use crate::event::EventKey;
    use crate::state::{BattleSession, Side};

    fn run(session: &mut BattleSession, action: Action) -> HandlerOutcome {
        let (items, locale, config) = (TestItems, locale(), config());
        let env = BattleEnv::new(&items, &locale, &config);
        let mut rng = SequenceRng::constant(0.5);
        execute(session, &env, &mut rng, Side::A, &action)
    }

    #[test]
    fn heal_clamps_and_reports_actual_amount() {
        let mut session = active_session();
        session.side_a.units[0].current_hp = 90;

        let outcome = run(&mut session, Action::use_item("potion", None));

        assert!(outcome.advance_turn);
        assert_eq!(session.side_a.units[0].current_hp, 100);
        assert_eq!(session.side_a.item_count("potion"), 1);
        assert!(session.side_a.has_used_item_this_turn);
        assert_eq!(outcome.notifications[0].key, EventKey::ItemHeal);
        assert_eq!(outcome.notifications[0].payload.get("amount"), Some(&10u32.into()));
    }

    #[test]
    fn revive_restores_fraction_of_max_hp() {
        let mut session = active_session();
        session.side_a.units[1].current_hp = 0;
        session.side_a.units[1].mark_fainted_if_down();

        let outcome = run(&mut session, Action::use_item("revive", Some(1)));

        let unit = &session.side_a.units[1];
        assert_eq!(outcome.notifications[0].key, EventKey::ItemRevive);
        assert_eq!(unit.current_hp, 40);
        assert!(!unit.is_fainted);
        assert!(unit.can_act);
    }

    #[test]
    fn cure_removes_named_effect_or_reports_no_effect() {
        let mut session = active_session();
        let outcome = run(&mut session, Action::use_item("antidote", None));
        assert_eq!(outcome.notifications[0].key, EventKey::ItemCureNoEffect);

        let mut session = active_session();
        let mut notes = Vec::new();
        apply_effect(
            &mut session.side_a.units[0],
            EffectType::Poison,
            Some(3),
            None,
            Side::B,
            &mut notes,
        );
        let outcome = run(&mut session, Action::use_item("antidote", None));
        let keys: Vec<_> = outcome.notifications.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![EventKey::StatusRemoved, EventKey::ItemCure]);
        assert!(session.side_a.units[0].status_effects.is_empty());
    }

    #[test]
    fn inapplicable_item_is_not_consumed() {
        let mut session = active_session();
        let outcome = run(&mut session, Action::use_item("potion", None));
        assert!(!outcome.advance_turn);
        assert_eq!(outcome.notifications[0].key, EventKey::ItemNotApplicable);
        assert_eq!(session.side_a.item_count("potion"), 2);
        assert!(!session.side_a.has_used_item_this_turn);
    }
}
