//! Collection operations
//!
//! Every operation takes a snapshot of the collection and returns a new one;
//! the input is never modified. Collections are ordered newest first.
//! Operations addressed by id act on every task carrying that id, so an
//! imported collection with duplicate ids stays consistent.

use super::model::{Priority, Task, TaskId};

/// Prepend a new task
///
/// The text is expected to have passed [`validate`](super::validate).
pub fn add(tasks: &[Task], text: &str, priority: Priority) -> Vec<Task> {
    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.push(Task::new(text, priority));
    next.extend_from_slice(tasks);
    next
}

/// Flip the completion flag of the task with `id`
pub fn toggle(tasks: &[Task], id: &TaskId) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if &task.id == id {
                let mut task = task.clone();
                task.completed = !task.completed;
                task
            } else {
                task.clone()
            }
        })
        .collect()
}

/// Replace the text of the task with `id`
///
/// No-op when the trimmed text is empty or equal to the current text.
pub fn edit(tasks: &[Task], id: &TaskId, new_text: &str) -> Vec<Task> {
    let trimmed = new_text.trim();
    if trimmed.is_empty() {
        return tasks.to_vec();
    }

    tasks
        .iter()
        .map(|task| {
            if &task.id == id && task.text != trimmed {
                let mut task = task.clone();
                task.text = trimmed.to_string();
                task
            } else {
                task.clone()
            }
        })
        .collect()
}

/// Remove the task with `id`
pub fn delete(tasks: &[Task], id: &TaskId) -> Vec<Task> {
    tasks.iter().filter(|task| &task.id != id).cloned().collect()
}

/// Remove every completed task
pub fn clear_completed(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|task| !task.completed).cloned().collect()
}

/// Remove every task
pub fn clear_all(_tasks: &[Task]) -> Vec<Task> {
    Vec::new()
}

/// Swap in a whole new collection (import, reset)
///
/// Priorities were already normalized when the tasks were deserialized.
/// Duplicate ids are kept as they are.
pub fn replace_all(_tasks: &[Task], new_tasks: Vec<Task>) -> Vec<Task> {
    new_tasks
}

/// Look up the first task with `id`
pub fn find<'a>(tasks: &'a [Task], id: &TaskId) -> Option<&'a Task> {
    tasks.iter().find(|task| &task.id == id)
}
