//! InMemoryKv - ordered in-memory backend for tests, demos and single-process servers.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::{KeyPage, KvBackend, KvError};

/// In-memory key-value backend backed by a `BTreeMap`.
///
/// Keys iterate in lexicographic order, so prefix listings are stable.
/// Clone-friendly via Arc: clones share the same storage.
#[derive(Clone, Default)]
pub struct InMemoryKv {
    storage: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryKv {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of keys across every prefix.
    ///
    /// Counts through a poisoned lock; the data calls still report poisoning.
    pub fn len(&self) -> usize {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvBackend for InMemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let storage = self.storage.read().map_err(|_| KvError::Poisoned("get"))?;
        Ok(storage.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
        let mut storage = self.storage.write().map_err(|_| KvError::Poisoned("put"))?;
        storage.insert(key.to_string(), value);
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, KvError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| KvError::Poisoned("put_if_absent"))?;

        if storage.contains_key(key) {
            return Ok(false);
        }
        storage.insert(key.to_string(), value);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let mut storage = self.storage.write().map_err(|_| KvError::Poisoned("delete"))?;
        Ok(storage.remove(key).is_some())
    }

    async fn list_keys(
        &self,
        prefix: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<KeyPage, KvError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| KvError::Poisoned("list_keys"))?;

        let lower = match start_after {
            Some(after) if after >= prefix => Bound::Excluded(after.to_string()),
            _ => Bound::Included(prefix.to_string()),
        };

        let mut page = KeyPage::default();
        for key in storage
            .range::<String, _>((lower, Bound::Unbounded))
            .map(|(key, _)| key)
        {
            if !key.starts_with(prefix) {
                break;
            }
            if page.keys.len() == limit {
                page.has_more = true;
                break;
            }
            page.keys.push(key.clone());
        }

        Ok(page)
    }
}
