//! Task text validation and priority normalization

use std::fmt;

use serde::Serialize;

use super::model::Priority;

/// Longest accepted task text, in characters, after trimming
pub const MAX_TEXT_LEN: usize = 200;

/// A reason a task text was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationError {
    EmptyText,
    TooLong,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => f.write_str("Task description is required"),
            Self::TooLong => write!(
                f,
                "Task description must be less than {} characters",
                MAX_TEXT_LEN
            ),
        }
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl Validation {
    /// Convert into a `Result`, keeping the collected errors on failure
    pub fn into_result(self) -> crate::Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(crate::Error::Validation(self.errors))
        }
    }
}

/// Check a task text before it is added or edited
pub fn validate(text: &str) -> Validation {
    let trimmed_len = text.trim().chars().count();
    let mut errors = Vec::new();

    if trimmed_len == 0 {
        errors.push(ValidationError::EmptyText);
    }
    if trimmed_len > MAX_TEXT_LEN {
        errors.push(ValidationError::TooLong);
    }

    Validation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Map a priority label to [`Priority`], falling back to `Medium`
pub fn normalize_priority(value: &str) -> Priority {
    match value {
        "low" => Priority::Low,
        "medium" => Priority::Medium,
        "high" => Priority::High,
        _ => Priority::Medium,
    }
}
