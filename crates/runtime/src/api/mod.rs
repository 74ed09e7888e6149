//! Public API surface for runtime consumers.
//!
//! This module re-exports the types clients need to drive battles: the
//! error type, outbound updates, and the roster provider seam.
mod errors;
mod providers;
mod update;

pub use errors::{RepositoryError, Result, RuntimeError, StoreError};
pub use providers::{Roster, RosterProvider, StaticRosterProvider};
pub use update::{BattleUpdate, UpdateKind};
