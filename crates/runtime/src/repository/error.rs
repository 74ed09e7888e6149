//! Error types raised by repository implementations.

use battle_core::{BattleId, CodecError};
use thiserror::Error;

/// Errors surfaced by the live-session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state store lock was poisoned")]
    LockPoisoned,

    #[error("state store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode session {battle}")]
    Encode {
        battle: BattleId,
        #[source]
        source: CodecError,
    },

    #[error("stored session {battle} is corrupted")]
    Corrupted {
        battle: BattleId,
        #[source]
        source: CodecError,
    },
}

/// Errors surfaced by battle record repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("record for battle {0} already exists")]
    AlreadyExists(BattleId),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
