//! Seed collection used on first start and by "reset to sample"

use chrono::{DateTime, Duration, Utc};

use super::model::{Priority, Task};

/// Build the sample collection relative to `now`
pub fn sample_tasks(now: DateTime<Utc>) -> Vec<Task> {
    let entry = |text: &str, completed: bool, priority: Priority, days_ago: i64| {
        Task::new(text, priority)
            .with_completed(completed)
            .with_created_at(now - Duration::days(days_ago))
    };

    vec![
        entry("Learn React Components", true, Priority::High, 2),
        entry("Build To-Do List App", false, Priority::High, 1),
        entry("Style with Tailwind CSS", false, Priority::Medium, 0),
        entry("Test application functionality", false, Priority::Medium, 0),
        entry("Deploy to GitHub", false, Priority::Low, 0),
    ]
}
