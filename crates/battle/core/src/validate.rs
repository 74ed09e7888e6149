//! Admission control for submitted actions.
//!
//! Checks run in three groups and stop at the first failure:
//!
//! 1. phase legality
//! 2. actor-state legality (skipped for `SelectStarter`)
//! 3. payload legality
//!
//! A failure is a [`Rejection`]: a denial key plus payload, narrated to the
//! offending combatant. It never changes the session.

use crate::action::Action;
use crate::env::ItemOracle;
use crate::event::{EventKey, EventPayload, Notification};
use crate::state::{BattleSession, Side, TurnPhase};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub key: EventKey,
    pub payload: EventPayload,
}

impl Rejection {
    pub fn new(key: EventKey) -> Self {
        Self {
            key,
            payload: EventPayload::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<crate::event::PayloadValue>) -> Self {
        self.payload.insert(field, value);
        self
    }

    /// Addresses the denial to `session`'s combatant on `side`.
    pub fn into_notification(self, session: &BattleSession, side: Side) -> Notification {
        Notification {
            key: self.key,
            payload: self.payload,
            target: Some(session.combatant(side)),
        }
    }
}

pub struct ActionValidator<'a> {
    items: &'a dyn ItemOracle,
}

impl<'a> ActionValidator<'a> {
    pub fn new(items: &'a dyn ItemOracle) -> Self {
        Self { items }
    }

    pub fn validate(
        &self,
        session: &BattleSession,
        side: Side,
        action: &Action,
    ) -> Result<(), Rejection> {
        check_phase(session, side, action)?;
        if !matches!(action, Action::SelectStarter { .. }) {
            check_actor(session, side, action)?;
        }
        self.check_payload(session, side, action)
    }

    fn check_payload(
        &self,
        session: &BattleSession,
        side: Side,
        action: &Action,
    ) -> Result<(), Rejection> {
        let state = session.side(side);
        match action {
            Action::SelectStarter { unit_index } => {
                match state.unit(*unit_index) {
                    Some(unit) if !unit.is_fainted => Ok(()),
                    _ => Err(Rejection::new(EventKey::InvalidStarter).with("index", *unit_index)),
                }
            }
            Action::Switch { target_unit_index } => {
                let Some(unit) = state.unit(*target_unit_index) else {
                    return Err(Rejection::new(EventKey::SwitchFailedInvalidIndex)
                        .with("index", *target_unit_index));
                };
                if state.active_index == Some(*target_unit_index) {
                    return Err(Rejection::new(EventKey::SwitchFailedSameUnit)
                        .with("unit", unit.display_name.as_str()));
                }
                if unit.is_fainted {
                    return Err(Rejection::new(EventKey::SwitchFailedFaintedUnit)
                        .with("unit", unit.display_name.as_str()));
                }
                Ok(())
            }
            Action::Attack {
                move_id,
                target_unit_index,
            } => {
                let Some(mv) = state.active().and_then(|unit| unit.find_move(move_id)) else {
                    return Err(Rejection::new(EventKey::InvalidMove).with("move", move_id.as_str()));
                };
                if mv.targets_ally() {
                    let ally_ok = target_unit_index
                        .and_then(|index| state.unit(index))
                        .is_some_and(|ally| !ally.is_fainted);
                    if !ally_ok {
                        return Err(Rejection::new(EventKey::AllyTargetRequired)
                            .with("move", mv.name.as_str()));
                    }
                }
                Ok(())
            }
            Action::UseItem {
                item_id,
                target_unit_index,
            } => {
                if state.has_used_item_this_turn {
                    return Err(Rejection::new(EventKey::ItemAlreadyUsed));
                }
                if state.item_count(item_id) == 0 {
                    return Err(Rejection::new(EventKey::ItemNotOwned).with("item", item_id.as_str()));
                }
                let Some(definition) = self.items.definition(item_id) else {
                    return Err(Rejection::new(EventKey::ItemUnknown).with("item", item_id.as_str()));
                };
                let applicable = target_unit_index
                    .or(state.active_index)
                    .and_then(|index| state.unit(index))
                    .is_some_and(|unit| definition.effect.applies_to(unit));
                if !applicable {
                    return Err(Rejection::new(EventKey::ItemNotApplicable)
                        .with("item", definition.name.as_str()));
                }
                Ok(())
            }
        }
    }
}

fn check_phase(session: &BattleSession, side: Side, action: &Action) -> Result<(), Rejection> {
    let is_starter = matches!(action, Action::SelectStarter { .. });
    match session.phase {
        TurnPhase::Selection => {
            if !is_starter {
                return Err(Rejection::new(EventKey::WrongPhase).with("phase", session.phase.to_string()));
            }
            if session.side(side).has_selected_starter {
                return Err(Rejection::new(EventKey::AlreadySubmitted));
            }
            Ok(())
        }
        TurnPhase::Submission => {
            if is_starter {
                return Err(Rejection::new(EventKey::WrongPhase).with("phase", session.phase.to_string()));
            }
            if session.pending.has_submitted(side) {
                return Err(Rejection::new(EventKey::AlreadySubmitted));
            }
            Ok(())
        }
        _ => Err(Rejection::new(EventKey::WrongPhase).with("phase", session.phase.to_string())),
    }
}

fn check_actor(session: &BattleSession, side: Side, action: &Action) -> Result<(), Rejection> {
    let Some(unit) = session.side(side).active() else {
        return Err(Rejection::new(EventKey::NoActiveUnit));
    };
    if unit.is_fainted {
        if action.is_switch() {
            return Ok(());
        }
        return Err(Rejection::new(EventKey::KnockoutBlock).with("unit", unit.display_name.as_str()));
    }
    if let Some(effect) = unit.blocking_effect() {
        return Err(Rejection::new(EventKey::StatusBlock)
            .with("unit", unit.display_name.as_str())
            .with("effect", effect.name()));
    }
    Ok(())
}

/// True if the combatant on `side` is able to submit anything this window.
///
/// False when no unit is active or the active unit is conscious but held by
/// a blocking effect. A fainted active unit can always submit a switch: a
/// side without a healthy reserve has already lost.
pub fn can_submit(session: &BattleSession, side: Side) -> bool {
    session
        .side(side)
        .active()
        .is_some_and(|unit| !unit.is_blocked())
}
