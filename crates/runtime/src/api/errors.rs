//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the state store, record repositories, the rules
//! engine, and wire decoding so callers can bubble them up with consistent
//! context.
use battle_core::{ActionDecodeError, BattleId, CombatantId, EngineError};
use thiserror::Error;

pub use crate::repository::{RepositoryError, StoreError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("battle {0} not found")]
    NotFound(BattleId),

    #[error("no roster available for combatant {0}")]
    RosterUnavailable(CombatantId),

    #[error("unknown bot profile `{0}`")]
    UnknownBot(String),

    #[error("unknown bot strategy `{0}`")]
    UnknownStrategy(String),

    #[error("bot profile `{profile}` references unknown species {species}")]
    UnknownSpecies { profile: String, species: u32 },

    #[error("combatant {0} cannot fight themselves")]
    DuplicateCombatant(CombatantId),

    #[error("combatant {combatant} is not seated in battle {battle}")]
    NotSeated {
        battle: BattleId,
        combatant: CombatantId,
    },

    #[error("coordinator requires {0} to be configured before building")]
    MissingComponent(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Decode(#[from] ActionDecodeError),
}
