//! Battle session data model.
//!
//! [`BattleSession`] is the root aggregate. Between requests it is owned by
//! the state store; during a single step it is checked out and mutated in
//! place by [`crate::engine::TurnPhaseManager`].
mod side;
mod status;
mod unit;

pub use side::{PendingActions, PlayerBattleState};
pub use status::{StatusEffect, StatusEffects};
pub use unit::{EffectTarget, Modifiers, Move, MoveCategory, MoveEffect, UnitState};

use crate::action::Action;
use crate::event::BattleEvent;

/// Identifier of a battle session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleId(pub u64);

impl core::fmt::Display for BattleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a combatant. Negative values are AI opponents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub i64);

impl CombatantId {
    pub const fn is_bot(self) -> bool {
        self.0 < 0
    }
}

impl core::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two seats in a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub const fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Turn phase state machine.
///
/// ```text
/// Selection -> Submission -> Resolution -> EndOfTurn -> Submission
///                                                   \-> Finished
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnPhase {
    Selection,
    Submission,
    Resolution,
    EndOfTurn,
    Finished,
}

impl TurnPhase {
    /// Returns true if `next` is a legal successor of this phase.
    pub const fn can_transition_to(self, next: TurnPhase) -> bool {
        matches!(
            (self, next),
            (TurnPhase::Selection, TurnPhase::Submission)
                | (TurnPhase::Submission, TurnPhase::Resolution)
                | (TurnPhase::Resolution, TurnPhase::EndOfTurn)
                | (TurnPhase::EndOfTurn, TurnPhase::Submission)
                | (TurnPhase::EndOfTurn, TurnPhase::Finished)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleStatus {
    Active,
    Finished,
}

/// Root aggregate of one battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSession {
    pub id: BattleId,
    pub combatant_a: CombatantId,
    pub combatant_b: CombatantId,
    pub side_a: PlayerBattleState,
    pub side_b: PlayerBattleState,
    /// Starts at 1 and only ever increases.
    pub turn: u32,
    pub phase: TurnPhase,
    pub status: BattleStatus,
    pub winner: Option<CombatantId>,
    pub pending: PendingActions,
    /// Events produced by the current step. Transient: never persisted, and
    /// cleared at the start of every externally triggered step.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub event_log: Vec<BattleEvent>,
    pub is_bot_battle: bool,
    pub bot_strategy: Option<String>,
    /// Creation time in unix milliseconds, supplied by the caller.
    pub created_at_ms: i64,
}

impl BattleSession {
    /// Creates a session in the `Selection` phase.
    pub fn new(
        id: BattleId,
        combatant_a: CombatantId,
        side_a: PlayerBattleState,
        combatant_b: CombatantId,
        side_b: PlayerBattleState,
        created_at_ms: i64,
    ) -> Self {
        Self {
            id,
            combatant_a,
            combatant_b,
            side_a,
            side_b,
            turn: 1,
            phase: TurnPhase::Selection,
            status: BattleStatus::Active,
            winner: None,
            pending: PendingActions::default(),
            event_log: Vec::new(),
            is_bot_battle: false,
            bot_strategy: None,
            created_at_ms,
        }
    }

    /// Marks combatant B as an AI opponent driven by `strategy`.
    #[must_use]
    pub fn with_bot(mut self, strategy: impl Into<String>) -> Self {
        self.is_bot_battle = true;
        self.bot_strategy = Some(strategy.into());
        self
    }

    pub fn side_of(&self, combatant: CombatantId) -> Option<Side> {
        if combatant == self.combatant_a {
            Some(Side::A)
        } else if combatant == self.combatant_b {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn combatant(&self, side: Side) -> CombatantId {
        match side {
            Side::A => self.combatant_a,
            Side::B => self.combatant_b,
        }
    }

    pub fn side(&self, side: Side) -> &PlayerBattleState {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut PlayerBattleState {
        match side {
            Side::A => &mut self.side_a,
            Side::B => &mut self.side_b,
        }
    }

    pub fn pending_action(&self, side: Side) -> Option<&Action> {
        self.pending.get(side)
    }

    pub fn is_finished(&self) -> bool {
        self.status == BattleStatus::Finished
    }

    /// Returns the side whose whole party has fainted, preferring A when
    /// both are wiped.
    pub fn wiped_side(&self) -> Option<Side> {
        Side::BOTH.into_iter().find(|&side| self.side(side).is_wiped())
    }

    /// True once at least one side has no conscious unit left.
    pub fn is_decided(&self) -> bool {
        self.wiped_side().is_some()
    }
}
