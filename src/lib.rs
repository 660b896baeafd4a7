//! Generic keyed entity storage over pluggable key-value backends.
//!
//! - [`EntityStore`]: typed create / get / list (cursor-paginated) / delete /
//!   bulk delete / one-time seeding for any [`Entity`].
//! - [`KvBackend`]: the persistence contract, with [`InMemoryKv`] and the
//!   [`TimeoutKv`] deadline wrapper.
//! - [`ChatStore`] / [`UserStore`]: the concrete chat and user stores.
//! - `http` (feature `http`): the JSON API over both stores.

// Lets `#[derive(Entity)]` expand to `::entity_store::...` inside this crate too.
extern crate self as entity_store;

mod entity;
mod kv;
mod lock;
mod models;
mod store;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "server")]
pub mod telemetry;

pub use entity::{Entity, Seed, ValidationError};
pub use kv::{InMemoryKv, KeyPage, KvBackend, KvError, SharedKv, TimeoutKv};
pub use lock::{InMemoryLockManager, LockError, LockManager};
pub use models::{Chat, ChatMessage, ChatStore, User, UserStore};
pub use store::{EntitiesExt, EntityStore, Page, StoreError, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// Derive macro shares the trait's name; they live in different namespaces.
pub use entity_store_macros::Entity;

// Re-exported so implementors of `KvBackend` / `LockManager` need no extra dependency.
pub use async_trait::async_trait;
