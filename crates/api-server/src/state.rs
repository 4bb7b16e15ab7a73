//! Application state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use todo_core::session::{ImportGuard, TodoSession};
use todo_core::storage::{FileStorage, TaskStorage};

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    session: RwLock<TodoSession<FileStorage>>,
    import_guard: ImportGuard,
    data_dir: PathBuf,
}

impl AppState {
    /// Open the session stored under the configured data directory
    pub async fn new(config: &Config) -> Self {
        let storage = TaskStorage::new(FileStorage::new(&config.data_dir));
        let session = TodoSession::open(storage, config.seed_sample).await;

        Self {
            inner: Arc::new(AppStateInner {
                session: RwLock::new(session),
                import_guard: ImportGuard::new(),
                data_dir: config.data_dir.clone(),
            }),
        }
    }

    /// Get reference to the live session
    pub fn session(&self) -> &RwLock<TodoSession<FileStorage>> {
        &self.inner.session
    }

    pub fn import_guard(&self) -> &ImportGuard {
        &self.inner.import_guard
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }
}
