//! Error type for entity store operations.

use thiserror::Error;

use crate::entity::ValidationError;
use crate::kv::KvError;
use crate::lock::LockError;

/// Everything an `EntityStore` operation can fail with.
///
/// Validation errors are raised before any backend call. Every other
/// variant propagates unchanged; nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The requested entity does not exist.
    #[error("{prefix} not found: {id}")]
    NotFound { prefix: &'static str, id: String },

    /// Missing or malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// `create` was called with an id that is already stored.
    #[error("{prefix} already exists: {id}")]
    Conflict { prefix: &'static str, id: String },

    /// The pagination cursor was not issued by this store.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// The key-value backend failed or timed out.
    #[error("backend error: {0}")]
    Backend(#[from] KvError),

    /// A value could not be encoded, or stored bytes could not be decoded.
    #[error("serialization error for {key}: {message}")]
    Serde { key: String, message: String },

    /// Some deletes in a bulk delete failed. Deletes that succeeded stay deleted;
    /// each failure carries the id and the error that stopped it.
    #[error("bulk delete removed {deleted} of {attempted} ids, {failed} failed", failed = .failures.len())]
    BulkDelete {
        deleted: usize,
        attempted: usize,
        failures: Vec<(String, StoreError)>,
    },

    /// A per-record lock could not be taken.
    #[error(transparent)]
    Lock(#[from] LockError),
}

impl StoreError {
    /// True for errors the caller caused (bad input, unknown id, duplicate id).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. }
                | StoreError::Validation(_)
                | StoreError::Conflict { .. }
                | StoreError::InvalidCursor(_)
        )
    }
}
