//! EntityStore - typed CRUD and cursor pagination over a key-value backend.
//!
//! Every entity type gets its own key namespace (`"{PREFIX}:{id}"`) and its
//! values are stored as JSON.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use entity_store::{EntitiesExt, InMemoryKv, SharedKv};
//!
//! let kv: SharedKv = Arc::new(InMemoryKv::new());
//! let users = kv.entities::<User>();
//!
//! users.create(user).await?;
//! let page = users.list(None, Some(10)).await?;
//! let next = users.list(page.next_cursor.as_deref(), Some(10)).await?;
//! ```

mod cursor;
mod error;
mod page;

use std::collections::BTreeSet;
use std::marker::PhantomData;

use tracing::{debug, info, warn};

use crate::entity::{Entity, Seed, ValidationError};
use crate::kv::SharedKv;

pub use error::StoreError;
pub use page::Page;

/// Page size used when `list` is called without a limit.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Larger limits are clamped to this.
pub const MAX_PAGE_SIZE: usize = 1000;

const SEED_MARKER_PREFIX: &str = "__meta:seeded:";

/// Typed store for one entity type.
///
/// Cheap to clone; clones share the backend.
pub struct EntityStore<T> {
    kv: SharedKv,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        Self {
            kv: self.kv.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new(kv: SharedKv) -> Self {
        Self {
            kv,
            _marker: PhantomData,
        }
    }

    /// Access the backend.
    pub fn backend(&self) -> &SharedKv {
        &self.kv
    }

    /// Storage key for an id: `"{PREFIX}:{id}"`.
    pub fn key(id: &str) -> String {
        format!("{}:{}", T::PREFIX, id)
    }

    fn key_prefix() -> String {
        format!("{}:", T::PREFIX)
    }

    fn encode(key: &str, value: &T) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(value).map_err(|e| StoreError::Serde {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn decode(key: &str, bytes: &[u8]) -> Result<T, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Serde {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    /// Insert a new entity. Fails with `Conflict` if the id is already stored.
    ///
    /// Validation runs before any backend call.
    pub async fn create(&self, value: T) -> Result<T, StoreError> {
        value.validate()?;

        let key = Self::key(value.id());
        let bytes = Self::encode(&key, &value)?;

        if !self.kv.put_if_absent(&key, bytes).await? {
            return Err(StoreError::Conflict {
                prefix: T::PREFIX,
                id: value.id().to_string(),
            });
        }

        debug!(%key, "entity created");
        Ok(value)
    }

    /// Upsert an entity (insert or replace, no existence check).
    ///
    /// Used by read-modify-write operations that already hold the record's lock.
    pub async fn save(&self, value: &T) -> Result<(), StoreError> {
        value.validate()?;

        let key = Self::key(value.id());
        let bytes = Self::encode(&key, value)?;
        self.kv.put(&key, bytes).await?;

        debug!(%key, "entity saved");
        Ok(())
    }

    /// Get an entity by id. Returns `None` if not found.
    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let key = Self::key(id);
        match self.kv.get(&key).await? {
            Some(bytes) => Ok(Some(Self::decode(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Get an entity by id, treating absence as an error.
    pub async fn require(&self, id: &str) -> Result<T, StoreError> {
        self.get(id).await?.ok_or_else(|| StoreError::NotFound {
            prefix: T::PREFIX,
            id: id.to_string(),
        })
    }

    /// True if an entity with this id is stored.
    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.kv.get(&Self::key(id)).await?.is_some())
    }

    /// List up to `limit` entities after the position encoded by `cursor`.
    ///
    /// `limit` defaults to [`DEFAULT_PAGE_SIZE`] and is clamped to
    /// [`MAX_PAGE_SIZE`]; `Some(0)` is rejected. Entities deleted between
    /// listing keys and reading them are skipped.
    pub async fn list(
        &self,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Page<T>, StoreError> {
        let limit = match limit {
            Some(0) => return Err(ValidationError::ZeroLimit.into()),
            Some(n) => n.min(MAX_PAGE_SIZE),
            None => DEFAULT_PAGE_SIZE,
        };

        let key_prefix = Self::key_prefix();
        let start_after = cursor
            .map(|c| cursor::decode(c, &key_prefix))
            .transpose()?;

        let listed = self
            .kv
            .list_keys(&key_prefix, start_after.as_deref(), limit)
            .await?;

        let mut items = Vec::with_capacity(listed.keys.len());
        for key in &listed.keys {
            match self.kv.get(key).await? {
                Some(bytes) => items.push(Self::decode(key, &bytes)?),
                None => debug!(%key, "entity vanished between listing and read"),
            }
        }

        let next_cursor = if listed.has_more {
            listed.keys.last().map(|key| cursor::encode(key))
        } else {
            None
        };

        debug!(prefix = T::PREFIX, count = items.len(), more = listed.has_more, "listed entities");
        Ok(Page { items, next_cursor })
    }

    /// Delete an entity. Returns `true` if something was removed; deleting an
    /// absent id is not an error.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let key = Self::key(id);
        let removed = self.kv.delete(&key).await?;
        debug!(%key, removed, "entity delete");
        Ok(removed)
    }

    /// Delete every id in `ids` (duplicates count once). Returns how many were
    /// actually removed.
    ///
    /// Absent ids are skipped silently. A failure on one id does not stop the
    /// others; failures are reported together as `BulkDelete` and the deletes
    /// that succeeded are not rolled back.
    pub async fn delete_many<I, S>(&self, ids: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = unique_ids(ids);
        let mut tally = BulkDeleteTally::new(T::PREFIX, ids.len());
        for id in ids {
            let result = self.delete(&id).await;
            tally.record(id, result);
        }
        tally.finish()
    }
}

/// De-duplicated, ordered ids for a bulk delete.
pub(crate) fn unique_ids<I, S>(ids: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter().map(|id| id.as_ref().to_string()).collect()
}

/// Running result of a bulk delete: every id is attempted, failures are
/// collected instead of ending the batch.
pub(crate) struct BulkDeleteTally {
    prefix: &'static str,
    attempted: usize,
    deleted: usize,
    failures: Vec<(String, StoreError)>,
}

impl BulkDeleteTally {
    pub(crate) fn new(prefix: &'static str, attempted: usize) -> Self {
        Self {
            prefix,
            attempted,
            deleted: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, id: String, result: Result<bool, StoreError>) {
        match result {
            Ok(true) => self.deleted += 1,
            Ok(false) => {}
            Err(err) => self.failures.push((id, err)),
        }
    }

    pub(crate) fn finish(self) -> Result<usize, StoreError> {
        let BulkDeleteTally {
            prefix,
            attempted,
            deleted,
            failures,
        } = self;

        if failures.is_empty() {
            debug!(prefix, attempted, deleted, "bulk delete");
            return Ok(deleted);
        }

        warn!(
            prefix,
            attempted,
            deleted,
            failed = failures.len(),
            "bulk delete partially failed"
        );
        Err(StoreError::BulkDelete {
            deleted,
            attempted,
            failures,
        })
    }
}

impl<T: Seed> EntityStore<T> {
    /// Backend key of the per-type seeded marker.
    pub fn seed_marker() -> String {
        format!("{}{}", SEED_MARKER_PREFIX, T::PREFIX)
    }

    /// Write the default dataset once per entity type.
    ///
    /// The marker lives in the backend, so it holds across restarts and
    /// instances. Seed records are written with `put_if_absent`: racing first
    /// callers never duplicate or overwrite a record, and existing records
    /// with a colliding id are kept.
    pub async fn ensure_seed(&self) -> Result<(), StoreError> {
        let marker = Self::seed_marker();
        if self.kv.get(&marker).await?.is_some() {
            return Ok(());
        }

        let mut written = 0usize;
        for value in T::seed() {
            value.validate()?;
            let key = Self::key(value.id());
            let bytes = Self::encode(&key, &value)?;
            if self.kv.put_if_absent(&key, bytes).await? {
                written += 1;
            }
        }

        let stamp = serde_json::json!({ "seededAt": chrono::Utc::now().to_rfc3339() });
        self.kv.put(&marker, stamp.to_string().into_bytes()).await?;

        info!(prefix = T::PREFIX, written, "seeded default dataset");
        Ok(())
    }
}

/// Extension trait for typed store access on a shared backend.
pub trait EntitiesExt {
    /// Get a typed entity store.
    fn entities<T: Entity>(&self) -> EntityStore<T>;
}

impl EntitiesExt for SharedKv {
    fn entities<T: Entity>(&self) -> EntityStore<T> {
        EntityStore::new(self.clone())
    }
}
