use super::HandlerOutcome;
use crate::event::{EventKey, Notification};
use crate::state::{BattleSession, Side};

/// Sets the opening active unit. Not a combat turn.
pub(super) fn select_starter(session: &mut BattleSession, side: Side, index: usize) -> HandlerOutcome {
    let actor = session.combatant(side);
    let state = session.side_mut(side);

    let Some(unit) = state.unit(index).filter(|unit| !unit.is_fainted) else {
        return HandlerOutcome::held(vec![
            Notification::to(EventKey::InvalidStarter, actor).with("index", index),
        ]);
    };
    let name = unit.display_name.clone();

    state.active_index = Some(index);
    state.has_selected_starter = true;

    HandlerOutcome::held(vec![
        Notification::broadcast(EventKey::StarterSelected)
            .with("player", actor)
            .with("unit", name),
    ])
}
