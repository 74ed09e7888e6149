//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`EngineError`, `ActionDecodeError`, `CodecError`)
//! live next to the code that raises them. This module only provides the
//! shared severity classification they all report through [`BattleError`].
//!
//! Rule denials (wrong phase, fainted target, ...) are *not* errors: they are
//! returned as [`crate::validate::Rejection`] values and narrated to the
//! offending combatant.

/// Severity level of an error, used for categorization and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input from a caller, should not retry without changes.
    ///
    /// Examples: unknown action kind, unknown combatant
    Validation,

    /// Unexpected state inconsistency. These indicate bugs.
    ///
    /// Examples: illegal phase transition, idle turn limit exceeded
    Internal,

    /// Persisted data cannot be trusted.
    ///
    /// Examples: snapshot with a foreign magic or unsupported version
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// Use `#[derive(thiserror::Error)]` for the Display/Error impl and classify
/// severity by who is at fault, not by impact.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, used in logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
