//! Export and import of task collections as JSON backup files
//!
//! An export wraps the collection in a versioned envelope. Imports accept any
//! envelope with a `todos` array, regardless of version, and keep only records
//! that carry `id`, `text` and `completed`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::task::Task;
use crate::{Error, Result};

/// Envelope version written by this crate
pub const EXPORT_VERSION: &str = "1.0.0";

const REQUIRED_FIELDS: [&str; 3] = ["id", "text", "completed"];

/// Export file contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    pub todos: Vec<Task>,
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

impl ExportEnvelope {
    pub fn new(todos: Vec<Task>, exported_at: DateTime<Utc>) -> Self {
        Self {
            todos,
            exported_at,
            version: EXPORT_VERSION.to_string(),
        }
    }
}

/// Backup file name for the given moment: `todos-backup-YYYY-MM-DD.json`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("todos-backup-{}.json", now.format("%Y-%m-%d"))
}

/// Render the pretty-printed export document
pub fn export_document(tasks: &[Task], now: DateTime<Utc>) -> Result<String> {
    let envelope = ExportEnvelope::new(tasks.to_vec(), now);
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Write an export document into `dir` and return its path
pub async fn export_to_file(dir: &Path, tasks: &[Task], now: DateTime<Utc>) -> Result<PathBuf> {
    let document = export_document(tasks, now)?;
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(export_file_name(now));
    tokio::fs::write(&path, document).await?;
    info!("Exported {} todos to {:?}", tasks.len(), path);
    Ok(path)
}

/// Parse an export document into the tasks it carries
///
/// Fails with [`Error::ImportFormat`] when the text is not JSON or has no
/// `todos` array. Records missing a required field are dropped silently, as
/// are records whose fields do not fit the task model.
pub fn parse_import(contents: &str) -> Result<Vec<Task>> {
    let document: Value =
        serde_json::from_str(contents).map_err(|e| Error::ImportFormat(e.to_string()))?;

    let Some(records) = document.get("todos").and_then(Value::as_array) else {
        return Err(Error::ImportFormat("Invalid data format".to_string()));
    };

    let tasks: Vec<Task> = records
        .iter()
        .filter(|record| has_required_fields(record))
        .filter_map(|record| match Task::deserialize(record) {
            Ok(task) => Some(task),
            Err(e) => {
                debug!("Skipping unreadable imported record: {}", e);
                None
            }
        })
        .collect();

    info!(
        "Parsed {} of {} imported records",
        tasks.len(),
        records.len()
    );
    Ok(tasks)
}

/// Decode raw file bytes and parse them as an export document
pub fn decode_import(bytes: &[u8]) -> Result<Vec<Task>> {
    let contents = std::str::from_utf8(bytes).map_err(|e| Error::ImportRead(e.to_string()))?;
    parse_import(contents)
}

/// Read and parse a backup file
pub async fn import_from_file(path: &Path) -> Result<Vec<Task>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Error::ImportRead(e.to_string()))?;
    decode_import(&bytes)
}

fn has_required_fields(record: &Value) -> bool {
    record
        .as_object()
        .is_some_and(|fields| REQUIRED_FIELDS.iter().all(|name| fields.contains_key(*name)))
}
