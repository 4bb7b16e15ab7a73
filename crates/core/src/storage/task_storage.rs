//! Storage slot for the whole task collection
//!
//! The collection is mirrored as one JSON array under a fixed key. Writes never
//! raise: a failed save is logged and reported as `false` so the caller can
//! keep working in memory.

use serde::Serialize;
use tracing::{debug, error, warn};

use super::backend::StorageBackend;
use crate::task::Task;

/// Key the collection is stored under
pub const STORAGE_KEY: &str = "todo-app-todos";

/// Result of reading the storage slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing has been saved yet
    Empty,
    /// Data is present but unreadable; carries the reason
    Corrupt(String),
    /// The stored collection
    Loaded(Vec<Task>),
}

/// Introspection of the storage slot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub has_data: bool,
    /// Length of the stored string in bytes
    pub size: usize,
    pub item_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Persistence gateway over a [`StorageBackend`]
///
/// Only ever sees borrowed snapshots and hands back owned collections.
#[derive(Debug)]
pub struct TaskStorage<B> {
    backend: B,
}

impl<B: StorageBackend> TaskStorage<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Serialize and store the full collection
    pub async fn save(&self, tasks: &[Task]) -> bool {
        let serialized = match serde_json::to_string(tasks) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("Error serializing todos for storage: {}", e);
                return false;
            }
        };

        match self.backend.set(STORAGE_KEY, &serialized).await {
            Ok(()) => {
                debug!("Saved {} todos ({} bytes)", tasks.len(), serialized.len());
                true
            }
            Err(e) => {
                error!("Error saving todos to storage: {}", e);
                false
            }
        }
    }

    /// Read the stored collection
    ///
    /// A slot that cannot be read at all is reported as `Corrupt` too.
    pub async fn load(&self) -> LoadOutcome {
        let serialized = match self.backend.get(STORAGE_KEY).await {
            Ok(Some(serialized)) => serialized,
            Ok(None) => return LoadOutcome::Empty,
            Err(e) => {
                warn!("Error reading todos from storage: {}", e);
                return LoadOutcome::Corrupt(e.to_string());
            }
        };

        match serde_json::from_str::<Vec<Task>>(&serialized) {
            Ok(tasks) => LoadOutcome::Loaded(tasks),
            Err(e) => {
                warn!("Error loading todos from storage: {}", e);
                LoadOutcome::Corrupt(e.to_string())
            }
        }
    }

    /// Remove the stored collection
    pub async fn clear(&self) -> bool {
        match self.backend.remove(STORAGE_KEY).await {
            Ok(()) => true,
            Err(e) => {
                error!("Error clearing todos from storage: {}", e);
                false
            }
        }
    }

    /// Describe the slot without modifying it
    pub async fn stats(&self) -> StorageStats {
        let serialized = match self.backend.get(STORAGE_KEY).await {
            Ok(Some(serialized)) if !serialized.is_empty() => serialized,
            Ok(_) => return StorageStats::default(),
            Err(e) => {
                return StorageStats {
                    error: Some(e.to_string()),
                    ..StorageStats::default()
                }
            }
        };

        let (item_count, error) = match serde_json::from_str::<serde_json::Value>(&serialized) {
            Ok(value) => (value.as_array().map_or(0, Vec::len), None),
            Err(e) => (0, Some(e.to_string())),
        };

        StorageStats {
            has_data: true,
            size: serialized.len(),
            item_count,
            error,
        }
    }
}
