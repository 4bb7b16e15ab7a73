//! Derived views over a task collection
//!
//! Filtering, sorting and statistics never modify the collection they read;
//! each returns a fresh value computed from the snapshot.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task};

/// Completion status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl From<&str> for StatusFilter {
    /// Unknown values select everything
    fn from(value: &str) -> Self {
        match value {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::All,
        }
    }
}

/// Display ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortCriterion {
    #[default]
    DateDesc,
    DateAsc,
    Priority,
    Name,
}

impl From<&str> for SortCriterion {
    /// Unknown values fall back to newest first
    fn from(value: &str) -> Self {
        match value {
            "date-asc" => Self::DateAsc,
            "priority" => Self::Priority,
            "name" => Self::Name,
            _ => Self::DateDesc,
        }
    }
}

/// Task counts per priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Summary of a whole collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_percentage: u32,
    pub by_priority: PriorityCounts,
}

/// Keep tasks matching `status`, preserving their relative order
pub fn filter_by_status(tasks: &[Task], status: StatusFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| match status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        })
        .cloned()
        .collect()
}

/// Return a sorted copy of `tasks`; ties keep their existing order
pub fn sort_by(tasks: &[Task], criterion: SortCriterion) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    match criterion {
        SortCriterion::DateDesc => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortCriterion::DateAsc => sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortCriterion::Priority => sorted.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        SortCriterion::Name => sorted.sort_by(|a, b| collate(&a.text, &b.text)),
    }
    sorted
}

/// What a list view shows: filter first, then sort
pub fn filtered_sorted(
    tasks: &[Task],
    status: StatusFilter,
    criterion: SortCriterion,
) -> Vec<Task> {
    sort_by(&filter_by_status(tasks, status), criterion)
}

/// Compute statistics over the full collection
pub fn compute_stats(tasks: &[Task]) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let completion_percentage = if total > 0 {
        (completed as f64 / total as f64 * 100.0).round() as u32
    } else {
        0
    };

    let mut by_priority = PriorityCounts::default();
    for task in tasks {
        match task.priority {
            Priority::High => by_priority.high += 1,
            Priority::Medium => by_priority.medium += 1,
            Priority::Low => by_priority.low += 1,
        }
    }

    TaskStats {
        total,
        completed,
        pending: total - completed,
        completion_percentage,
        by_priority,
    }
}

/// Human label for a creation date: "Today", "Yesterday", "3 days ago",
/// or "Jan 5, 2024" once a week has passed
pub fn relative_date(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_days().abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => created_at.format("%b %-d, %Y").to_string(),
    }
}

// Case-insensitive first; on a case-only tie lowercase sorts before uppercase.
fn collate(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| b.cmp(a))
}
