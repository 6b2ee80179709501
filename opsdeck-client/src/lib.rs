//! OPSDECK Client - REST access to the dashboard backend.
//!
//! [`RestClient`] implements [`DashboardRepository`], so panel services run
//! against HTTP or the in-memory mock unchanged.

pub mod api_client;
pub mod config;

pub use api_client::{ApiClientError, RestClient};
pub use config::{ClientConfig, ConfigError};

use async_trait::async_trait;
use opsdeck_core::{
    DailyTask, FetchError, LogEntry, Project, ProjectId, Settings, SettingsPatch, TaskId,
};
use opsdeck_storage::DashboardRepository;

#[async_trait]
impl DashboardRepository for RestClient {
    async fn daily_task_list(&self) -> Result<Vec<DailyTask>, FetchError> {
        self.list_daily_tasks().await.map_err(Into::into)
    }

    async fn daily_task_create(&self, title: &str) -> Result<DailyTask, FetchError> {
        self.create_daily_task(title).await.map_err(Into::into)
    }

    async fn daily_task_toggle(
        &self,
        id: TaskId,
        is_completed: bool,
    ) -> Result<DailyTask, FetchError> {
        self.toggle_daily_task(id, is_completed)
            .await
            .map_err(Into::into)
    }

    async fn daily_task_delete(&self, id: TaskId) -> Result<(), FetchError> {
        self.delete_daily_task(id).await.map_err(Into::into)
    }

    async fn project_list(&self) -> Result<Vec<Project>, FetchError> {
        self.list_projects().await.map_err(Into::into)
    }

    async fn log_create(
        &self,
        project_id: ProjectId,
        message: &str,
    ) -> Result<LogEntry, FetchError> {
        self.create_log(project_id, message).await.map_err(Into::into)
    }

    async fn settings_get(&self) -> Result<Settings, FetchError> {
        self.get_settings().await.map_err(Into::into)
    }

    async fn settings_update(&self, patch: &SettingsPatch) -> Result<Settings, FetchError> {
        self.update_settings(patch).await.map_err(Into::into)
    }
}
