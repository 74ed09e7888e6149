//! In-memory [`BattleStateStore`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use battle_core::{BattleId, BattleSession, codec};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::repository::{BattleStateStore, StoreError};

struct Entry {
    bytes: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Stores sessions as versioned snapshots with an expiry.
///
/// Sessions are encoded on write and decoded on read, so a caller never
/// shares memory with the store. Expired entries read as absent. The live-id
/// index is bounded: past `index_capacity` the oldest id leaves the index
/// (its session stays readable until it expires).
pub struct InMemoryBattleStore {
    entries: RwLock<HashMap<BattleId, Entry>>,
    index: Mutex<VecDeque<BattleId>>,
    locks: Mutex<HashMap<BattleId, Arc<tokio::sync::Mutex<()>>>>,
    default_ttl: Duration,
    index_capacity: usize,
}

impl InMemoryBattleStore {
    pub fn new(default_ttl: Duration, index_capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            index: Mutex::new(VecDeque::new()),
            locks: Mutex::new(HashMap::new()),
            default_ttl,
            index_capacity: index_capacity.max(1),
        }
    }

    fn track(&self, id: BattleId) -> Result<(), StoreError> {
        let mut index = self.index.lock().map_err(|_| StoreError::LockPoisoned)?;
        if index.contains(&id) {
            return Ok(());
        }
        index.push_back(id);
        while index.len() > self.index_capacity {
            if let Some(dropped) = index.pop_front() {
                warn!(
                    target: "runtime::store",
                    battle = %dropped,
                    capacity = self.index_capacity,
                    "live index full, dropping oldest id"
                );
            }
        }
        Ok(())
    }

    fn untrack(&self, id: BattleId) -> Result<(), StoreError> {
        let mut index = self.index.lock().map_err(|_| StoreError::LockPoisoned)?;
        index.retain(|tracked| *tracked != id);
        drop(index);

        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        Ok(())
    }
}

/// Drops locks nobody outside the map holds.
///
/// Every caller keeps its `Arc` for as long as it waits on or holds the
/// guard, so a count of one means the lock is idle and can be recreated on
/// demand.
fn prune_idle(locks: &mut HashMap<BattleId, Arc<tokio::sync::Mutex<()>>>) {
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
}

impl BattleStateStore for InMemoryBattleStore {
    fn get(&self, id: BattleId) -> Result<Option<BattleSession>, StoreError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
            match entries.get(&id) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => {
                    let session = codec::decode(&entry.bytes)
                        .map_err(|source| StoreError::Corrupted { battle: id, source })?;
                    return Ok(Some(session));
                }
                Some(_) => {}
            }
        }

        debug!(target: "runtime::store", battle = %id, "evicting expired session");
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .remove(&id);
        self.untrack(id)?;
        Ok(None)
    }

    fn set(&self, id: BattleId, session: &BattleSession, ttl: Option<Duration>) -> Result<(), StoreError> {
        let bytes = codec::encode(session).map_err(|source| StoreError::Encode { battle: id, source })?;
        let expires_at = Instant::now() + ttl.unwrap_or(self.default_ttl);

        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .insert(id, Entry { bytes, expires_at });
        self.track(id)
    }

    fn delete(&self, id: BattleId) -> Result<bool, StoreError> {
        let removed = self
            .entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .remove(&id)
            .is_some();
        self.untrack(id)?;
        Ok(removed)
    }

    fn list_ids(&self) -> Result<Vec<BattleId>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        let index = self.index.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index
            .iter()
            .copied()
            .filter(|id| entries.get(id).is_some_and(|entry| !entry.is_expired(now)))
            .collect())
    }

    fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Instant::now();
        let expired: Vec<BattleId> = {
            let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
            let expired: Vec<BattleId> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(id, _)| *id)
                .collect();
            for id in &expired {
                entries.remove(id);
            }
            expired
        };

        for id in &expired {
            self.untrack(*id)?;
        }
        prune_idle(&mut self.locks.lock().unwrap_or_else(PoisonError::into_inner));
        if !expired.is_empty() {
            debug!(target: "runtime::store", purged = expired.len(), "purged expired sessions");
        }
        Ok(expired.len())
    }

    fn session_lock(&self, id: BattleId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        prune_idle(&mut locks);
        Arc::clone(locks.entry(id).or_default())
    }
}
