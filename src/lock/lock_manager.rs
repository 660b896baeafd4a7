use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::LockError;

/// Factory trait for obtaining per-key async locks.
///
/// `ChatStore` takes one lock per chat id around `send_message`. The default
/// `InMemoryLockManager` only serializes callers within one process;
/// distributed implementations would talk to a lease service instead.
#[async_trait]
pub trait LockManager: Send + Sync {
    /// Get (or create) the lock for the given key.
    ///
    /// Repeated calls with the same key must return the same logical lock
    /// while any holder or waiter is alive.
    fn get_lock(&self, key: &str) -> Result<Arc<Mutex<()>>, LockError>;

    /// Wait for the lock on `key` and hold it until the guard is dropped.
    async fn acquire(&self, key: &str) -> Result<OwnedMutexGuard<()>, LockError> {
        let lock = self.get_lock(key)?;
        Ok(lock.lock_owned().await)
    }
}
