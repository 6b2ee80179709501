//! OPSDECK Test Utilities
//!
//! Centralized test infrastructure for the OPSDECK workspace:
//! - Proptest generators for entity types
//! - Fixtures for common scenarios
//! - Re-export of the mock repository

// Re-export mock storage from its source crate
pub use opsdeck_storage::MockRepository;

// Re-export core types for convenience
pub use opsdeck_core::{
    new_entity_id, DailyTask, LogEntry, Project, ProjectId, Settings, SettingsPatch, TaskId,
};

use proptest::prelude::*;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

/// Non-blank task titles.
pub fn arb_task_title() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,23}"
}

pub fn arb_daily_task() -> impl Strategy<Value = DailyTask> {
    (arb_task_title(), any::<bool>()).prop_map(|(title, is_completed)| {
        let mut task = DailyTask::new(title);
        task.is_completed = is_completed;
        task
    })
}

pub fn arb_project() -> impl Strategy<Value = Project> {
    ("[A-Za-z][A-Za-z0-9 ]{0,15}", proptest::option::of("[a-z ]{1,32}")).prop_map(
        |(name, description)| {
            let project = Project::new(name);
            match description {
                Some(description) => project.with_description(description),
                None => project,
            }
        },
    )
}

pub fn arb_settings() -> impl Strategy<Value = Settings> {
    (1u32..=64, "[a-z0-9/_]{0,20}", 1u32..=64, "[a-z0-9/_]{0,20}").prop_map(
        |(telegram_threads, telegram_folder_path, chrome_threads, chrome_folder_path)| Settings {
            telegram_threads,
            telegram_folder_path,
            chrome_threads,
            chrome_folder_path,
        },
    )
}

pub fn arb_settings_patch() -> impl Strategy<Value = SettingsPatch> {
    (
        proptest::option::of(1u32..=64),
        proptest::option::of("[a-z0-9/_]{0,20}"),
        proptest::option::of(1u32..=64),
        proptest::option::of("[a-z0-9/_]{0,20}"),
    )
        .prop_map(
            |(telegram_threads, telegram_folder_path, chrome_threads, chrome_folder_path)| {
                SettingsPatch {
                    telegram_threads,
                    telegram_folder_path,
                    chrome_threads,
                    chrome_folder_path,
                }
            },
        )
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Mock repository with the demo seed data (two tasks, two projects).
pub fn seeded_repository() -> MockRepository {
    MockRepository::seeded()
}

/// Settings with every field away from its default.
pub fn sample_settings() -> Settings {
    Settings {
        telegram_threads: 2,
        telegram_folder_path: "/accounts/telegram".to_string(),
        chrome_threads: 3,
        chrome_folder_path: "/accounts/chrome".to_string(),
    }
}
