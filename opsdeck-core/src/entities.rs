//! Entity records for the dashboard domain.
//!
//! The wire format is camelCase JSON, matching the backend's PATCH contract
//! (`telegramThreads`, `isCompleted`, ...). All records are tagged with
//! explicit, validated fields.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{new_entity_id, LogId, ProjectId, TaskId, Timestamp};

/// A single entry in the daily-task checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTask {
    pub id: TaskId,
    pub title: String,
    pub is_completed: bool,
}

impl DailyTask {
    /// Create a new, not-yet-completed task.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            title: title.into(),
            is_completed: false,
        }
    }

    /// Validate a raw title, returning the trimmed form.
    ///
    /// Rejects titles that are empty after trimming; no I/O has happened by
    /// the time this fails.
    pub fn validate_title(raw: &str) -> Result<String, ValidationError> {
        let title = raw.trim();
        if title.is_empty() {
            return Err(ValidationError::RequiredFieldMissing { field: "title" });
        }
        Ok(title.to_string())
    }
}

/// A launchable project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into(),
            description: None,
        }
    }

    /// Builder: attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A launch log entry recorded against a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: LogId,
    pub project_id: ProjectId,
    pub message: String,
    pub created_at: Timestamp,
}

impl LogEntry {
    pub fn new(project_id: ProjectId, message: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            project_id,
            message: message.into(),
            created_at: chrono::Utc::now(),
        }
    }
}

/// System settings managed by the settings form.
///
/// Thread counts are always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub telegram_threads: u32,
    pub telegram_folder_path: String,
    pub chrome_threads: u32,
    pub chrome_folder_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            telegram_threads: 1,
            telegram_folder_path: String::new(),
            chrome_threads: 1,
            chrome_folder_path: String::new(),
        }
    }
}

impl Settings {
    /// Merge a partial update into these settings, last-write-wins per field.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(threads) = patch.telegram_threads {
            self.telegram_threads = threads;
        }
        if let Some(path) = &patch.telegram_folder_path {
            self.telegram_folder_path = path.clone();
        }
        if let Some(threads) = patch.chrome_threads {
            self.chrome_threads = threads;
        }
        if let Some(path) = &patch.chrome_folder_path {
            self.chrome_folder_path = path.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.telegram_threads < 1 {
            return Err(ValidationError::InvalidValue {
                field: "telegram_threads",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.chrome_threads < 1 {
            return Err(ValidationError::InvalidValue {
                field: "chrome_threads",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Partial settings update with PATCH semantics: absent field = unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_threads: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_folder_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_threads: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_folder_path: Option<String>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the Telegram thread count.
    pub fn with_telegram_threads(mut self, threads: u32) -> Self {
        self.telegram_threads = Some(threads);
        self
    }

    /// Builder: set the Telegram accounts folder path.
    pub fn with_telegram_folder_path(mut self, path: impl Into<String>) -> Self {
        self.telegram_folder_path = Some(path.into());
        self
    }

    /// Builder: set the Chrome thread count.
    pub fn with_chrome_threads(mut self, threads: u32) -> Self {
        self.chrome_threads = Some(threads);
        self
    }

    /// Builder: set the Chrome accounts folder path.
    pub fn with_chrome_folder_path(mut self, path: impl Into<String>) -> Self {
        self.chrome_folder_path = Some(path.into());
        self
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.telegram_threads.is_none()
            && self.telegram_folder_path.is_none()
            && self.chrome_threads.is_none()
            && self.chrome_folder_path.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.telegram_threads == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "telegram_threads",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.chrome_threads == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "chrome_threads",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
