//! Well-known cache keys for the dashboard panels.

use opsdeck_query::QueryKey;

/// The daily-task checklist.
pub fn daily_tasks() -> QueryKey {
    QueryKey::new("daily_tasks")
}

/// The launchable project list.
pub fn projects() -> QueryKey {
    QueryKey::new("projects")
}

/// The settings form's backing data.
pub fn settings() -> QueryKey {
    QueryKey::new("settings")
}
