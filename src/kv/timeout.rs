//! TimeoutKv - bounds every backend call by a deadline.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::{KeyPage, KvBackend, KvError};

/// Wraps a backend so that every call fails with [`KvError::Timeout`] once
/// `after` elapses. The wrapped call is dropped at that point; whether its
/// write landed is up to the inner backend. No retry is attempted.
#[derive(Clone)]
pub struct TimeoutKv<B> {
    inner: B,
    after: Duration,
}

impl<B> TimeoutKv<B> {
    pub fn new(inner: B, after: Duration) -> Self {
        Self { inner, after }
    }

    /// Access the inner backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, KvError>
    where
        F: Future<Output = Result<T, KvError>>,
    {
        match tokio::time::timeout(self.after, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, after_ms = self.after.as_millis() as u64, "key-value call timed out");
                Err(KvError::Timeout {
                    operation,
                    after_ms: self.after.as_millis() as u64,
                })
            }
        }
    }
}

#[async_trait]
impl<B: KvBackend> KvBackend for TimeoutKv<B> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        self.bounded("get", self.inner.get(key)).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), KvError> {
        self.bounded("put", self.inner.put(key, value)).await
    }

    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, KvError> {
        self.bounded("put_if_absent", self.inner.put_if_absent(key, value))
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        self.bounded("delete", self.inner.delete(key)).await
    }

    async fn list_keys(
        &self,
        prefix: &str,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<KeyPage, KvError> {
        self.bounded("list_keys", self.inner.list_keys(prefix, start_after, limit))
            .await
    }
}
