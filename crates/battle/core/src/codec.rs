//! Versioned binary snapshot format for sessions.
//!
//! ```text
//! [4-byte magic "BTLS"][u16 LE format version][bincode BattleSession]
//! ```
//!
//! The event log is not part of the snapshot.

use crate::error::{BattleError, ErrorSeverity};
use crate::state::BattleSession;

pub const MAGIC: [u8; 4] = *b"BTLS";
pub const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("snapshot truncated: {len} bytes")]
    Truncated { len: usize },

    #[error("snapshot magic mismatch")]
    BadMagic,

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("failed to encode session: {0}")]
    Encode(String),

    #[error("failed to decode session: {0}")]
    Decode(String),
}

impl BattleError for CodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Encode(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Truncated { .. } => "SNAPSHOT_TRUNCATED",
            Self::BadMagic => "SNAPSHOT_BAD_MAGIC",
            Self::UnsupportedVersion { .. } => "SNAPSHOT_UNSUPPORTED_VERSION",
            Self::Encode(_) => "SNAPSHOT_ENCODE",
            Self::Decode(_) => "SNAPSHOT_DECODE",
        }
    }
}

pub fn encode(session: &BattleSession) -> Result<Vec<u8>, CodecError> {
    let body = bincode::serialize(session).map_err(|e| CodecError::Encode(e.to_string()))?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<BattleSession, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Truncated { len: bytes.len() });
    }
    let (magic, rest) = bytes.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(CodecError::BadMagic);
    }
    let (version, body) = rest.split_at(2);
    let found = u16::from_le_bytes([version[0], version[1]]);
    if found != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }
    bincode::deserialize(body).map_err(|e| CodecError::Decode(e.to_string()))
}
