//! Key-value backends - the persistence layer every `EntityStore` delegates to.
//!
//! A backend stores opaque byte values under string keys and can enumerate
//! keys by prefix in ascending order. It knows nothing about entities,
//! cursors, or seeding; those live in [`crate::store`].
//!
//! ## Example
//!
//! ```ignore
//! use entity_store::{InMemoryKv, KvBackend, TimeoutKv};
//! use std::time::Duration;
//!
//! let kv = TimeoutKv::new(InMemoryKv::new(), Duration::from_secs(2));
//! kv.put("user:u1", b"{}".to_vec()).await?;
//! let page = kv.list_keys("user:", None, 10).await?;
//! ```

mod error;
mod in_memory;
mod timeout;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::KvError;
pub use in_memory::InMemoryKv;
pub use timeout::TimeoutKv;

/// A shared, type-erased backend handle.
pub type SharedKv = Arc<dyn KvBackend>;

/// One page of keys returned by [`KvBackend::list_keys`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPage {
    /// Keys in ascending order, all starting with the requested prefix.
    pub keys: Vec<String>,
    /// True when more keys with the same prefix exist after the last one returned.
    pub has_more: bool,
}

/// Abstract key-value persistence.
///
/// A single `put`, `put_if_absent` or `delete` is atomic. Nothing spanning
/// more than one call is.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read a value. Returns `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Write a value, replacing any previous one.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), KvError>;

    /// Write a value only if the key is absent. Returns `true` if written.
    ///
    /// The default implementation is a plain get-then-put and is NOT atomic;
    /// backends with a native compare-and-set primitive should override it.
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, KvError> {
        if self.get(key).await?.is_some() {
            return Ok(false);
        }
        self.put(key, value).await?;
        Ok(true)
    }

    /// Remove a key. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> Result<bool, KvError>;

    /// List up to `limit` keys starting with `prefix` that sort strictly after
    /// `start_after` (or from the beginning when `None`).
    async fn list_keys(
        &self,
        prefix: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<KeyPage, KvError>;
}

#[async_trait]
impl<B: KvBackend + ?Sized> KvBackend for Arc<B> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
        (**self).put(key, value).await
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, KvError> {
        (**self).put_if_absent(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        (**self).delete(key).await
    }

    async fn list_keys(
        &self,
        prefix: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<KeyPage, KvError> {
        (**self).list_keys(prefix, start_after, limit).await
    }
}
