//! Player actions and their handlers.
//!
//! Each [`Action`] kind has exactly one handler. Handlers are pure functions
//! of `(session, actor, payload)` that mutate the session and describe what
//! happened as notifications. Handlers do not return errors: one that cannot
//! apply its action reports a denial and leaves the session untouched.
mod attack;
mod decode;
mod item;
mod starter;
mod switch;

pub use decode::ActionDecodeError;

use crate::env::{BattleEnv, RngOracle};
use crate::event::Notification;
use crate::state::{BattleSession, Side};

/// Action kinds, ordered by resolution priority.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    SelectStarter,
    Attack,
    Switch,
    UseItem,
}

impl ActionKind {
    /// Resolution priority. Higher acts first.
    pub const fn priority(self) -> u8 {
        match self {
            ActionKind::SelectStarter => 100,
            ActionKind::Switch => 10,
            ActionKind::UseItem => 9,
            ActionKind::Attack => 5,
        }
    }
}

/// A combatant's intent for one window.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    SelectStarter {
        unit_index: usize,
    },
    Attack {
        move_id: String,
        /// Ally slot for moves with ally-targeted effects.
        target_unit_index: Option<usize>,
    },
    Switch {
        target_unit_index: usize,
    },
    UseItem {
        item_id: String,
        /// Defaults to the active unit.
        target_unit_index: Option<usize>,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::SelectStarter { .. } => ActionKind::SelectStarter,
            Action::Attack { .. } => ActionKind::Attack,
            Action::Switch { .. } => ActionKind::Switch,
            Action::UseItem { .. } => ActionKind::UseItem,
        }
    }

    pub fn priority(&self) -> u8 {
        self.kind().priority()
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, Action::Switch { .. })
    }

    pub fn attack(move_id: impl Into<String>) -> Self {
        Action::Attack {
            move_id: move_id.into(),
            target_unit_index: None,
        }
    }

    pub fn switch(target_unit_index: usize) -> Self {
        Action::Switch { target_unit_index }
    }

    pub fn use_item(item_id: impl Into<String>, target_unit_index: Option<usize>) -> Self {
        Action::UseItem {
            item_id: item_id.into(),
            target_unit_index,
        }
    }
}

/// What a handler did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandlerOutcome {
    /// True if the action counted as the actor's combat turn.
    pub advance_turn: bool,
    pub notifications: Vec<Notification>,
}

impl HandlerOutcome {
    pub(crate) fn advanced(notifications: Vec<Notification>) -> Self {
        Self {
            advance_turn: true,
            notifications,
        }
    }

    pub(crate) fn held(notifications: Vec<Notification>) -> Self {
        Self {
            advance_turn: false,
            notifications,
        }
    }
}

/// Runs the handler for `action` on behalf of `side`.
pub fn execute(
    session: &mut BattleSession,
    env: &BattleEnv<'_>,
    rng: &mut dyn RngOracle,
    side: Side,
    action: &Action,
) -> HandlerOutcome {
    match action {
        Action::SelectStarter { unit_index } => starter::select_starter(session, side, *unit_index),
        Action::Attack {
            move_id,
            target_unit_index,
        } => attack::attack(session, env, rng, side, move_id, *target_unit_index),
        Action::Switch { target_unit_index } => switch::switch(session, side, *target_unit_index),
        Action::UseItem {
            item_id,
            target_unit_index,
        } => item::use_item(session, env, side, item_id, *target_unit_index),
    }
}
