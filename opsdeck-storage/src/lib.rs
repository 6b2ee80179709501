//! OPSDECK Storage - Repository Trait and Mock Implementation
//!
//! Defines the backend abstraction the dashboard fetches through. The query
//! engine never assumes in-process storage; it only ever calls this
//! capability. The HTTP implementation lives in opsdeck-client.

use std::sync::RwLock;

use async_trait::async_trait;

use opsdeck_core::{
    DailyTask, FetchError, LogEntry, Project, ProjectId, Settings, SettingsPatch, TaskId,
};

// ============================================================================
// REPOSITORY TRAIT
// ============================================================================

/// Backend capability for the dashboard panels.
///
/// Every method maps to one backend request; errors are fetch errors the
/// engine captures into cache or mutation state.
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    // === Daily Task Operations ===

    /// List the daily-task checklist, newest first.
    async fn daily_task_list(&self) -> Result<Vec<DailyTask>, FetchError>;

    /// Create a task; new tasks are prepended and start not completed.
    async fn daily_task_create(&self, title: &str) -> Result<DailyTask, FetchError>;

    /// Set the completion flag of one task.
    async fn daily_task_toggle(
        &self,
        id: TaskId,
        is_completed: bool,
    ) -> Result<DailyTask, FetchError>;

    /// Delete one task.
    async fn daily_task_delete(&self, id: TaskId) -> Result<(), FetchError>;

    // === Project / Log Operations ===

    /// List projects in backend order.
    async fn project_list(&self) -> Result<Vec<Project>, FetchError>;

    /// Record a launch log entry for a project.
    async fn log_create(
        &self,
        project_id: ProjectId,
        message: &str,
    ) -> Result<LogEntry, FetchError>;

    // === Settings Operations ===

    async fn settings_get(&self) -> Result<Settings, FetchError>;

    /// Merge a partial update, last-write-wins per field, and return the
    /// resulting settings.
    async fn settings_update(&self, patch: &SettingsPatch) -> Result<Settings, FetchError>;
}

// ============================================================================
// MOCK REPOSITORY
// ============================================================================

/// In-memory mock backend for development and testing.
#[derive(Debug, Default)]
pub struct MockRepository {
    tasks: RwLock<Vec<DailyTask>>,
    projects: RwLock<Vec<Project>>,
    logs: RwLock<Vec<LogEntry>>,
    settings: RwLock<Settings>,
}

impl MockRepository {
    /// Create an empty mock repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock repository seeded with demo data: two tasks, two
    /// projects, default settings.
    pub fn seeded() -> Self {
        let repo = Self::new();
        {
            let mut tasks = repo.tasks.write().unwrap();
            tasks.push(DailyTask::new("Task 1"));
            let mut done = DailyTask::new("Task 2");
            done.is_completed = true;
            tasks.push(done);
        }
        {
            let mut projects = repo.projects.write().unwrap();
            projects.push(Project::new("Project One").with_description("First demo project"));
            projects.push(Project::new("Project Two").with_description("Second demo project"));
        }
        repo
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.tasks.write().unwrap().clear();
        self.projects.write().unwrap().clear();
        self.logs.write().unwrap().clear();
        *self.settings.write().unwrap() = Settings::default();
    }

    /// Number of stored tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.read().unwrap().len()
    }

    /// Number of recorded log entries.
    pub fn log_count(&self) -> usize {
        self.logs.read().unwrap().len()
    }

    /// Snapshot of recorded log entries, in creation order.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.read().unwrap().clone()
    }

    /// Replace the stored projects.
    pub fn set_projects(&self, projects: Vec<Project>) {
        *self.projects.write().unwrap() = projects;
    }
}

#[async_trait]
impl DashboardRepository for MockRepository {
    async fn daily_task_list(&self) -> Result<Vec<DailyTask>, FetchError> {
        Ok(self.tasks.read().unwrap().clone())
    }

    async fn daily_task_create(&self, title: &str) -> Result<DailyTask, FetchError> {
        let task = DailyTask::new(title);
        self.tasks.write().unwrap().insert(0, task.clone());
        Ok(task)
    }

    async fn daily_task_toggle(
        &self,
        id: TaskId,
        is_completed: bool,
    ) -> Result<DailyTask, FetchError> {
        let mut tasks = self.tasks.write().unwrap();
        match tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.is_completed = is_completed;
                Ok(task.clone())
            }
            None => Err(FetchError::NotFound {
                resource: "daily_task",
                id,
            }),
        }
    }

    async fn daily_task_delete(&self, id: TaskId) -> Result<(), FetchError> {
        let mut tasks = self.tasks.write().unwrap();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(FetchError::NotFound {
                resource: "daily_task",
                id,
            });
        }
        Ok(())
    }

    async fn project_list(&self) -> Result<Vec<Project>, FetchError> {
        Ok(self.projects.read().unwrap().clone())
    }

    async fn log_create(
        &self,
        project_id: ProjectId,
        message: &str,
    ) -> Result<LogEntry, FetchError> {
        let known = self
            .projects
            .read()
            .unwrap()
            .iter()
            .any(|project| project.id == project_id);
        if !known {
            return Err(FetchError::NotFound {
                resource: "project",
                id: project_id,
            });
        }
        let entry = LogEntry::new(project_id, message);
        self.logs.write().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn settings_get(&self) -> Result<Settings, FetchError> {
        Ok(self.settings.read().unwrap().clone())
    }

    async fn settings_update(&self, patch: &SettingsPatch) -> Result<Settings, FetchError> {
        let mut settings = self.settings.write().unwrap();
        settings.apply(patch);
        Ok(settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_data_matches_demo_fixture() {
        let repo = MockRepository::seeded();
        let tasks = repo.daily_task_list().await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Task 1");
        assert!(!tasks[0].is_completed);
        assert!(tasks[1].is_completed);

        let projects = repo.project_list().await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "Project One");
    }

    #[tokio::test]
    async fn test_create_prepends_task() {
        let repo = MockRepository::seeded();
        let task = repo.daily_task_create("Buy milk").await.unwrap();
        assert!(!task.is_completed);

        let tasks = repo.daily_task_list().await.unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].id, task.id);
    }

    #[tokio::test]
    async fn test_toggle_flips_only_target() {
        let repo = MockRepository::seeded();
        let tasks = repo.daily_task_list().await.unwrap();
        let target = tasks[0].clone();

        let toggled = repo.daily_task_toggle(target.id, true).await.unwrap();
        assert!(toggled.is_completed);

        let tasks = repo.daily_task_list().await.unwrap();
        assert!(tasks[0].is_completed);
        assert!(tasks[1].is_completed); // untouched seed value
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_is_not_found() {
        let repo = MockRepository::seeded();
        let err = repo
            .daily_task_toggle(opsdeck_core::new_entity_id(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let repo = MockRepository::seeded();
        let tasks = repo.daily_task_list().await.unwrap();
        let target = tasks[0].id;

        repo.daily_task_delete(target).await.unwrap();
        let remaining = repo.daily_task_list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining.iter().all(|task| task.id != target));
    }

    #[tokio::test]
    async fn test_log_create_requires_known_project() {
        let repo = MockRepository::seeded();
        let err = repo
            .log_create(opsdeck_core::new_entity_id(), "launch")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(repo.log_count(), 0);

        let project = repo.project_list().await.unwrap()[0].clone();
        let entry = repo.log_create(project.id, "launch").await.unwrap();
        assert_eq!(entry.project_id, project.id);
        assert_eq!(repo.log_count(), 1);
    }

    #[tokio::test]
    async fn test_settings_update_merges() {
        let repo = MockRepository::new();
        let updated = repo
            .settings_update(&SettingsPatch::new().with_telegram_threads(4))
            .await
            .unwrap();
        assert_eq!(updated.telegram_threads, 4);
        assert_eq!(updated.chrome_threads, 1);

        let read_back = repo.settings_get().await.unwrap();
        assert_eq!(read_back, updated);
    }
}
