//! Per-key mutual exclusion for read-modify-write on a single record.
//!
//! The key-value backend has no transaction primitive, so operations that
//! read a record, change it, and write it back (appending a chat message)
//! take a lock keyed by `"{PREFIX}:{id}"` for the whole sequence.

mod error;
mod in_memory;
mod lock_manager;

pub use error::LockError;
pub use in_memory::InMemoryLockManager;
pub use lock_manager::LockManager;
