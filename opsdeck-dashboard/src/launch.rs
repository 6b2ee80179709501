//! Launch panel service: start a campaign against a selected project.

use std::sync::Arc;

use opsdeck_core::{LogEntry, Project, ProjectId, ValidationError};
use opsdeck_query::{Mutation, QueryCoordinator, QuerySnapshot};
use opsdeck_storage::DashboardRepository;

use crate::error::DashboardError;
use crate::keys;
use crate::notifications::Notifications;

/// A launch request as assembled by the launch form.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    /// The selected project; launching without one is a validation error.
    pub project_id: Option<ProjectId>,
    /// Optional first account index; unset means the whole range.
    pub start_range: Option<u32>,
    /// Optional last account index; unset means the whole range.
    pub end_range: Option<u32>,
    /// Whether "mix" mode is enabled.
    pub mix: bool,
}

impl LaunchRequest {
    pub fn for_project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    /// Builder: limit the account range.
    pub fn with_range(mut self, start: u32, end: u32) -> Self {
        self.start_range = Some(start);
        self.end_range = Some(end);
        self
    }

    /// Builder: enable mix mode.
    pub fn with_mix(mut self, mix: bool) -> Self {
        self.mix = mix;
        self
    }

    /// Render the launch log message for this request.
    pub fn message(&self, project_name: &str) -> String {
        format!(
            "Launched {} (Range: {}-{}, Mix: {})",
            project_name,
            range_bound(self.start_range),
            range_bound(self.end_range),
            if self.mix { "Yes" } else { "No" },
        )
    }
}

fn range_bound(bound: Option<u32>) -> String {
    match bound {
        Some(value) => value.to_string(),
        None => "All".to_string(),
    }
}

/// Queries the project list and records launch log entries.
pub struct LaunchService {
    repo: Arc<dyn DashboardRepository>,
    coordinator: QueryCoordinator,
    launch_mutation: Mutation,
    notifications: Arc<Notifications>,
}

impl LaunchService {
    pub fn new(
        coordinator: QueryCoordinator,
        repo: Arc<dyn DashboardRepository>,
        notifications: Arc<Notifications>,
    ) -> Self {
        Self {
            repo,
            launch_mutation: Mutation::new(coordinator.clone(), vec![keys::projects()]),
            coordinator,
            notifications,
        }
    }

    /// Current project list; serves cached data immediately and refreshes in
    /// the background when stale.
    pub fn projects(&self) -> QuerySnapshot<Vec<Project>> {
        let repo = Arc::clone(&self.repo);
        self.coordinator.query(keys::projects(), move || {
            let repo = Arc::clone(&repo);
            async move { repo.project_list().await }
        })
    }

    pub fn is_launching(&self) -> bool {
        self.launch_mutation.is_pending()
    }

    /// Launch a campaign.
    ///
    /// A missing project selection fails before any backend call is issued;
    /// the caller gets the validation error and a notification is raised. On
    /// success the project list key is invalidated and a success
    /// notification is raised.
    pub async fn launch(&self, request: LaunchRequest) -> Result<LogEntry, DashboardError> {
        let project_id = match request.project_id {
            Some(id) => id,
            None => {
                self.notifications.error("Select a project before launching");
                return Err(ValidationError::RequiredFieldMissing { field: "project" }.into());
            }
        };

        let project_name = self
            .coordinator
            .snapshot::<Vec<Project>>(&keys::projects())
            .data
            .and_then(|projects| {
                projects
                    .into_iter()
                    .find(|project| project.id == project_id)
            })
            .map(|project| project.name)
            .unwrap_or_else(|| "Unknown Project".to_string());

        let message = request.message(&project_name);
        let repo = Arc::clone(&self.repo);
        let result = self
            .launch_mutation
            .mutate(async move { repo.log_create(project_id, &message).await })
            .await;

        match result {
            Ok(entry) => {
                tracing::info!(project_id = %project_id, "campaign launched");
                self.notifications
                    .success(format!("Campaign started for {project_name}"));
                Ok(entry)
            }
            Err(error) => {
                self.notifications
                    .error(format!("Launch failed: {error}"));
                Err(error.into())
            }
        }
    }
}
