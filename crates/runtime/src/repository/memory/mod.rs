//! In-memory repository implementations for tests and single-process runs.

mod record;
mod store;

pub use record::InMemoryRecordRepository;
pub use store::InMemoryBattleStore;
