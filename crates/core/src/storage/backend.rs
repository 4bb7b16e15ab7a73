//! Key-value storage backend trait
//!
//! Defines the interface for the string slot the task collection is mirrored to.

use async_trait::async_trait;

use crate::Result;

/// A key-value store holding serialized strings
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Read the value under `key`, `None` when nothing was stored
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key succeeds
    async fn remove(&self, key: &str) -> Result<()>;
}
