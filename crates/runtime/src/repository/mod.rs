//! Repository layer for dynamic runtime data
//!
//! Repositories handle data that CHANGES during play:
//! - Live battle sessions (expiring cache)
//! - Finished battle records (durable)
//!
//! Static content (items, species, bots, locales) is handled by oracles, not
//! repositories.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, StoreError};
pub use file::FileRecordRepository;
pub use memory::{InMemoryBattleStore, InMemoryRecordRepository};
pub use traits::{BattleRecordRepository, BattleStateStore};
pub use types::BattleRecord;
