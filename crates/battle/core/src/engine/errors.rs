//! Error types for the turn pipeline.

use crate::error::{BattleError, ErrorSeverity};
use crate::state::{BattleId, CombatantId, TurnPhase};

/// Hard failures of a step. Rule denials are not errors; see
/// [`crate::validate::Rejection`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("battle {battle} is already finished")]
    BattleFinished { battle: BattleId },

    #[error("combatant {combatant} is not part of battle {battle}")]
    UnknownCombatant {
        battle: BattleId,
        combatant: CombatantId,
    },

    #[error("illegal phase transition {from} -> {to}")]
    InvalidTransition { from: TurnPhase, to: TurnPhase },

    #[error("battle {battle} resolved {turns} idle turns without progress")]
    IdleTurnLimit { battle: BattleId, turns: u32 },
}

impl BattleError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::BattleFinished { .. } | Self::UnknownCombatant { .. } => {
                ErrorSeverity::Validation
            }
            Self::InvalidTransition { .. } | Self::IdleTurnLimit { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BattleFinished { .. } => "BATTLE_FINISHED",
            Self::UnknownCombatant { .. } => "UNKNOWN_COMBATANT",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::IdleTurnLimit { .. } => "IDLE_TURN_LIMIT",
        }
    }
}
