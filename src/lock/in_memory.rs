use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

use super::{LockError, LockManager};

/// Registry size above which idle locks are dropped on the next lookup.
const PRUNE_THRESHOLD: usize = 1024;

/// In-memory lock manager backed by a `HashMap<String, Arc<tokio::sync::Mutex<()>>>`.
///
/// Lazily creates one lock per unique key and returns the same `Arc` for
/// repeated lookups. Locks nobody holds or waits on are pruned once the
/// registry grows past a threshold.
#[derive(Default)]
pub struct InMemoryLockManager {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently tracked, even if the registry is poisoned.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl LockManager for InMemoryLockManager {
    fn get_lock(&self, key: &str) -> Result<Arc<AsyncMutex<()>>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("lock manager map poisoned".into()))?;

        if locks.len() >= PRUNE_THRESHOLD {
            // only the registry references an idle lock
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }

        Ok(locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone())
    }
}
