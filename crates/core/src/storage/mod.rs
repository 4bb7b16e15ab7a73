//! Storage module
//!
//! The key-value slot the task collection is persisted to, with a file and an
//! in-memory backend.

mod backend;
mod file_store;
mod memory;
mod task_storage;

pub use backend::StorageBackend;
pub use file_store::FileStorage;
pub use memory::MemoryStorage;
pub use task_storage::{LoadOutcome, StorageStats, TaskStorage, STORAGE_KEY};
