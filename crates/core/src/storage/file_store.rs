//! File-based storage backend
//!
//! Stores each key as a `<key>.json` file in a data directory. Writes go to a
//! temp file that is renamed over the slot, so a slot always holds the last
//! complete value.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::backend::StorageBackend;
use crate::{Error, Result};

/// Storage backend writing one file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory holding the slot files
    dir: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage rooted at `dir`
    ///
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(Error::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!(".{}.{}.tmp", key, Uuid::new_v4().as_hyphenated()))
    }
}

async fn write_synced(path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(value.as_bytes()).await?;
    file.sync_all().await
}

#[async_trait]
impl StorageBackend for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        // Ensure parent directory exists
        tokio::fs::create_dir_all(&self.dir).await?;

        let temp_path = self.temp_path_for(key);
        if let Err(err) = write_synced(&temp_path, value).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::Storage(format!("Failed to write temp file for {}: {}", key, err)));
        }

        if let Err(err) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Error::Storage(format!("Failed to replace {:?}: {}", path, err)));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}
