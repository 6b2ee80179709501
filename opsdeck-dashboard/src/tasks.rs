//! Daily-task panel service.

use std::sync::Arc;

use opsdeck_core::{DailyTask, TaskId};
use opsdeck_query::{Mutation, QueryCoordinator, QuerySnapshot, Subscription};
use opsdeck_storage::DashboardRepository;

use crate::error::DashboardError;
use crate::keys;

/// Queries and mutations for the daily-task checklist. Every write
/// invalidates the task list key, so readers converge on backend state.
pub struct TasksService {
    repo: Arc<dyn DashboardRepository>,
    coordinator: QueryCoordinator,
    create_mutation: Mutation,
    toggle_mutation: Mutation,
    delete_mutation: Mutation,
}

impl TasksService {
    pub fn new(coordinator: QueryCoordinator, repo: Arc<dyn DashboardRepository>) -> Self {
        let invalidates = vec![keys::daily_tasks()];
        Self {
            repo,
            create_mutation: Mutation::new(coordinator.clone(), invalidates.clone()),
            toggle_mutation: Mutation::new(coordinator.clone(), invalidates.clone()),
            delete_mutation: Mutation::new(coordinator.clone(), invalidates),
            coordinator,
        }
    }

    /// Current checklist state; serves cached data immediately and refreshes
    /// in the background when stale.
    pub fn tasks(&self) -> QuerySnapshot<Vec<DailyTask>> {
        let repo = Arc::clone(&self.repo);
        self.coordinator.query(keys::daily_tasks(), move || {
            let repo = Arc::clone(&repo);
            async move { repo.daily_task_list().await }
        })
    }

    /// Observe checklist changes.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(QuerySnapshot<Vec<DailyTask>>) + Send + Sync + 'static,
    {
        self.coordinator
            .subscribe(keys::daily_tasks(), move |entry| {
                observer(QuerySnapshot::from_entry(entry))
            })
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.coordinator.unsubscribe(subscription);
    }

    pub fn is_creating(&self) -> bool {
        self.create_mutation.is_pending()
    }

    /// Create a task. Blank titles are rejected before any backend call.
    pub async fn create(&self, title: &str) -> Result<DailyTask, DashboardError> {
        let title = DailyTask::validate_title(title)?;
        let repo = Arc::clone(&self.repo);
        let task = self
            .create_mutation
            .mutate(async move { repo.daily_task_create(&title).await })
            .await?;
        tracing::info!(task_id = %task.id, "daily task created");
        Ok(task)
    }

    pub async fn toggle(&self, id: TaskId, is_completed: bool) -> Result<DailyTask, DashboardError> {
        let repo = Arc::clone(&self.repo);
        self.toggle_mutation
            .mutate(async move { repo.daily_task_toggle(id, is_completed).await })
            .await
            .map_err(Into::into)
    }

    pub async fn delete(&self, id: TaskId) -> Result<(), DashboardError> {
        let repo = Arc::clone(&self.repo);
        self.delete_mutation
            .mutate(async move { repo.daily_task_delete(id).await })
            .await
            .map_err(Into::into)
    }
}
