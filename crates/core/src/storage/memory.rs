//! In-memory storage backend with an optional size quota

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::backend::StorageBackend;
use crate::{Error, Result};

/// Storage backend kept in process memory
///
/// With a quota set, a write that would push the total stored bytes past the
/// limit fails with [`Error::QuotaExceeded`] and leaves the old value in place.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total stored bytes across all keys
    pub fn with_quota(mut self, limit: usize) -> Self {
        self.quota = Some(limit);
        self
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;

        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let requested = others + value.len();
            if requested > limit {
                return Err(Error::QuotaExceeded { limit, requested });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
