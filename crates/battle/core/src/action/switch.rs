use super::HandlerOutcome;
use crate::event::{EventKey, Notification};
use crate::state::{BattleSession, Side};

pub(super) fn switch(session: &mut BattleSession, side: Side, target: usize) -> HandlerOutcome {
    let actor = session.combatant(side);
    let state = session.side_mut(side);

    let Some(unit) = state.unit(target) else {
        return HandlerOutcome::held(vec![
            Notification::to(EventKey::SwitchFailedInvalidIndex, actor).with("index", target),
        ]);
    };
    if state.active_index == Some(target) {
        return HandlerOutcome::held(vec![
            Notification::to(EventKey::SwitchFailedSameUnit, actor)
                .with("unit", unit.display_name.as_str()),
        ]);
    }
    if unit.is_fainted {
        return HandlerOutcome::held(vec![
            Notification::to(EventKey::SwitchFailedFaintedUnit, actor)
                .with("unit", unit.display_name.as_str()),
        ]);
    }

    let incoming = unit.display_name.clone();
    let outgoing = state
        .active()
        .map(|unit| unit.display_name.clone())
        .unwrap_or_default();
    state.active_index = Some(target);

    HandlerOutcome::advanced(vec![
        Notification::broadcast(EventKey::SwitchSuccess)
            .with("player", actor)
            .with("from", outgoing)
            .with("unit", incoming),
    ])
}
