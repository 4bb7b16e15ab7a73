//! Error types for the core library

use thiserror::Error;

use crate::task::ValidationError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid task: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Failed to parse file: {0}")]
    ImportFormat(String),

    #[error("Failed to read file: {0}")]
    ImportRead(String),

    #[error("Another import is already in progress")]
    ImportInProgress,

    #[error("Storage quota exceeded: {requested} bytes requested, limit is {limit}")]
    QuotaExceeded { limit: usize, requested: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
