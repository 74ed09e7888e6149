//! Keyed, cancellable delayed tasks.
//!
//! Scheduling a key that is already pending aborts the previous task. Every
//! registration carries a generation number, so a task that fires never
//! removes a newer registration for the same key.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use battle_core::{BattleId, CombatantId};
use tokio::task::JoinHandle;

/// Timers owned by the battle coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Grace period of a disconnected combatant.
    Disconnect(BattleId, CombatantId),
    /// Delayed bot submission.
    BotTurn(BattleId),
}

impl TimerKey {
    pub fn battle(&self) -> BattleId {
        match self {
            TimerKey::Disconnect(battle, _) | TimerKey::BotTurn(battle) => *battle,
        }
    }
}

struct Registration {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct TaskScheduler<K> {
    tasks: Arc<Mutex<HashMap<K, Registration>>>,
    generation: AtomicU64,
}

impl<K> Default for TaskScheduler<K> {
    fn default() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }
}

impl<K> TaskScheduler<K>
where
    K: Copy + Eq + Hash + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` after `delay` unless cancelled first. Replaces any pending
    /// task under the same key.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let tasks = Arc::clone(&self.tasks);

        // Hold the map lock across the spawn so the task cannot deregister
        // before it is registered.
        let mut pending = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = tasks.lock().unwrap_or_else(PoisonError::into_inner);
                match pending.get(&key) {
                    Some(current) if current.generation == generation => {
                        pending.remove(&key);
                    }
                    _ => return,
                }
            }
            task.await;
        });

        if let Some(previous) = pending.insert(key, Registration { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Cancels the pending task under `key`. Returns whether one existed.
    pub fn cancel(&self, key: &K) -> bool {
        let removed = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        match removed {
            Some(registration) => {
                registration.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancels every pending task whose key matches `predicate`.
    pub fn cancel_where(&self, predicate: impl Fn(&K) -> bool) -> usize {
        let mut pending = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let keys: Vec<K> = pending.keys().filter(|key| predicate(key)).copied().collect();
        for key in &keys {
            if let Some(registration) = pending.remove(key) {
                registration.handle.abort();
            }
        }
        keys.len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl TaskScheduler<TimerKey> {
    /// Cancels every timer of `battle`.
    pub fn cancel_battle(&self, battle: BattleId) -> usize {
        self.cancel_where(|key| key.battle() == battle)
    }
}
