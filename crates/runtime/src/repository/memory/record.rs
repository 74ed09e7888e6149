//! In-memory [`BattleRecordRepository`].

use std::collections::HashMap;
use std::sync::RwLock;

use battle_core::BattleId;

use crate::repository::error::Result;
use crate::repository::{BattleRecord, BattleRecordRepository, RepositoryError};

/// Thread-safe but not persistent across process restarts.
#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<HashMap<BattleId, BattleRecord>>,
}

impl InMemoryRecordRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BattleRecordRepository for InMemoryRecordRepository {
    fn save(&self, record: &BattleRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if records.contains_key(&record.battle_id) {
            return Err(RepositoryError::AlreadyExists(record.battle_id));
        }
        records.insert(record.battle_id, record.clone());
        Ok(())
    }

    fn load(&self, id: BattleId) -> Result<Option<BattleRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<BattleRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut all: Vec<BattleRecord> = records.values().cloned().collect();
        all.sort_by_key(|record| record.battle_id);
        Ok(all)
    }
}
