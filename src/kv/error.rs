use thiserror::Error;

/// Error type for key-value backend operations.
///
/// Every variant is transient from the store's point of view: the store
/// never retries, it hands the error to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    /// The backend did not answer within the configured deadline.
    #[error("key-value {operation} timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },
    /// The backend rejected or failed the call.
    #[error("key-value backend unavailable: {0}")]
    Unavailable(String),
    /// An in-process lock guarding backend state was poisoned.
    #[error("key-value backend lock poisoned during {0}")]
    Poisoned(&'static str),
}

impl KvError {
    /// Returns true for deadline expiries.
    pub fn is_timeout(&self) -> bool {
        matches!(self, KvError::Timeout { .. })
    }
}
