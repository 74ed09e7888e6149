//! Repository contracts for live sessions and finished battle records.

use std::sync::Arc;
use std::time::Duration;

use battle_core::{BattleId, BattleSession};

use super::error::{Result, StoreError};
use super::types::BattleRecord;

/// Keyed, expiring cache of live sessions.
///
/// Only whole-aggregate reads and writes are offered. Callers serialize
/// read-modify-write sequences on one battle through [`Self::session_lock`];
/// a failed write never touches the caller's copy.
pub trait BattleStateStore: Send + Sync {
    fn get(&self, id: BattleId) -> std::result::Result<Option<BattleSession>, StoreError>;

    /// Stores `session` under `id`. `None` applies the store's default TTL.
    fn set(
        &self,
        id: BattleId,
        session: &BattleSession,
        ttl: Option<Duration>,
    ) -> std::result::Result<(), StoreError>;

    /// Removes the session. Returns whether it was present.
    fn delete(&self, id: BattleId) -> std::result::Result<bool, StoreError>;

    /// Live battle ids, oldest first.
    fn list_ids(&self) -> std::result::Result<Vec<BattleId>, StoreError>;

    /// Evicts expired entries and returns how many were removed.
    fn purge_expired(&self) -> std::result::Result<usize, StoreError>;

    /// Per-battle async mutex serializing read-modify-write sequences.
    fn session_lock(&self, id: BattleId) -> Arc<tokio::sync::Mutex<()>>;
}

/// Durable store of finished battles.
pub trait BattleRecordRepository: Send + Sync {
    /// Persists a record. A second save for the same battle is rejected.
    fn save(&self, record: &BattleRecord) -> Result<()>;

    fn load(&self, id: BattleId) -> Result<Option<BattleRecord>>;

    fn list(&self) -> Result<Vec<BattleRecord>>;
}
