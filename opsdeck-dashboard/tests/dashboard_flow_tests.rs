//! End-to-end panel flows over the mock repository: checklist CRUD,
//! settings save, launch validation, and subscription-driven refresh.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use opsdeck_core::{
    DailyTask, FetchError, LogEntry, Project, ProjectId, Settings, SettingsPatch, TaskId,
};
use opsdeck_dashboard::{
    Dashboard, DashboardError, LaunchRequest, NotificationLevel, SettingsForm,
};
use opsdeck_query::{EngineConfig, QueryStatus};
use opsdeck_storage::{DashboardRepository, MockRepository};
use opsdeck_test_utils::{arb_settings, seeded_repository};
use proptest::prelude::*;

/// Poll until `condition` holds, failing the test after ~2 seconds.
async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within timeout");
}

fn dashboard_over(repo: Arc<MockRepository>) -> Dashboard {
    Dashboard::new(repo, EngineConfig::default())
}

#[tokio::test]
async fn daily_task_checklist_flow() {
    let repo = Arc::new(seeded_repository());
    let dashboard = dashboard_over(Arc::clone(&repo));

    // First read serves no data and kicks off the fetch.
    let snapshot = dashboard.tasks.tasks();
    assert!(snapshot.is_loading());
    assert!(snapshot.data.is_none());

    wait_until(|| dashboard.tasks.tasks().is_success()).await;
    assert_eq!(dashboard.tasks.tasks().data.unwrap().len(), 2);

    // Create: the list grows by one, new task first, not completed.
    let created = dashboard.tasks.create("Buy milk").await.unwrap();
    assert!(!created.is_completed);
    wait_until(|| {
        dashboard
            .tasks
            .tasks()
            .data
            .map(|tasks| tasks.len() == 3)
            .unwrap_or(false)
    })
    .await;
    let tasks = dashboard.tasks.tasks().data.unwrap();
    assert_eq!(tasks[0].title, "Buy milk");

    // Toggle: flips exactly the created task.
    let before: Vec<(TaskId, bool)> = tasks
        .iter()
        .filter(|task| task.id != created.id)
        .map(|task| (task.id, task.is_completed))
        .collect();
    dashboard.tasks.toggle(created.id, true).await.unwrap();
    wait_until(|| {
        dashboard
            .tasks
            .tasks()
            .data
            .and_then(|tasks| tasks.iter().find(|t| t.id == created.id).map(|t| t.is_completed))
            .unwrap_or(false)
    })
    .await;
    let tasks = dashboard.tasks.tasks().data.unwrap();
    for (id, was_completed) in before {
        let task = tasks.iter().find(|t| t.id == id).unwrap();
        assert_eq!(task.is_completed, was_completed);
    }

    // Delete: removes exactly the created id.
    dashboard.tasks.delete(created.id).await.unwrap();
    wait_until(|| {
        dashboard
            .tasks
            .tasks()
            .data
            .map(|tasks| tasks.len() == 2)
            .unwrap_or(false)
    })
    .await;
    assert!(dashboard
        .tasks
        .tasks()
        .data
        .unwrap()
        .iter()
        .all(|task| task.id != created.id));
}

#[tokio::test]
async fn blank_task_title_is_rejected_before_any_call() {
    let repo = Arc::new(seeded_repository());
    let dashboard = dashboard_over(Arc::clone(&repo));

    let result = dashboard.tasks.create("   ").await;
    assert!(matches!(result, Err(DashboardError::Validation(_))));
    assert_eq!(repo.task_count(), 2);
}

#[tokio::test]
async fn settings_partial_update_flow() {
    let repo = Arc::new(seeded_repository());
    let dashboard = dashboard_over(Arc::clone(&repo));

    wait_until(|| dashboard.settings.settings().is_success()).await;
    let before = dashboard.settings.settings().data.unwrap();

    let mut form = dashboard.settings.form().unwrap();
    assert!(!dashboard.settings.has_changes(&form));

    form.telegram_threads = "4".to_string();
    assert!(dashboard.settings.has_changes(&form));

    let saved = dashboard.settings.save(&form).await.unwrap();
    assert_eq!(saved.telegram_threads, 4);

    wait_until(|| {
        dashboard
            .settings
            .settings()
            .data
            .map(|s| s.telegram_threads == 4)
            .unwrap_or(false)
    })
    .await;

    let after = dashboard.settings.settings().data.unwrap();
    assert_eq!(after.telegram_folder_path, before.telegram_folder_path);
    assert_eq!(after.chrome_threads, before.chrome_threads);
    assert_eq!(after.chrome_folder_path, before.chrome_folder_path);

    let notifications = dashboard.notifications.take();
    assert!(notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Success && n.message == "Settings saved"));
}

#[tokio::test]
async fn launch_without_project_is_rejected_synchronously() {
    let repo = Arc::new(seeded_repository());
    let dashboard = dashboard_over(Arc::clone(&repo));

    let result = dashboard.launch.launch(LaunchRequest::default()).await;
    assert!(matches!(result, Err(DashboardError::Validation(_))));
    assert_eq!(repo.log_count(), 0);

    let notifications = dashboard.notifications.take();
    assert!(notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Error));
}

#[tokio::test]
async fn launch_records_log_with_range_and_mix() {
    let repo = Arc::new(seeded_repository());
    let dashboard = dashboard_over(Arc::clone(&repo));

    wait_until(|| dashboard.launch.projects().is_success()).await;
    let project = dashboard.launch.projects().data.unwrap()[0].clone();

    let entry = dashboard
        .launch
        .launch(
            LaunchRequest::for_project(project.id)
                .with_range(1, 100)
                .with_mix(true),
        )
        .await
        .unwrap();

    assert_eq!(entry.project_id, project.id);
    assert_eq!(
        entry.message,
        "Launched Project One (Range: 1-100, Mix: Yes)"
    );
    assert_eq!(repo.log_count(), 1);

    let notifications = dashboard.notifications.take();
    assert!(notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Success));
}

#[tokio::test]
async fn subscribed_checklist_refreshes_after_create() {
    let repo = Arc::new(seeded_repository());
    let dashboard = dashboard_over(Arc::clone(&repo));

    let statuses = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&statuses);
    let subscription = dashboard
        .tasks
        .subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.status));

    dashboard.tasks.tasks();
    wait_until(|| dashboard.tasks.tasks().is_success()).await;

    // The create mutation invalidates the subscribed key, which refetches
    // without anyone re-querying.
    dashboard.tasks.create("Stretch").await.unwrap();
    wait_until(|| {
        statuses
            .lock()
            .unwrap()
            .iter()
            .filter(|status| **status == QueryStatus::Success)
            .count()
            >= 2
    })
    .await;

    dashboard.tasks.unsubscribe(&subscription);
}

// A repository whose settings writes always fail; everything else delegates
// to the seeded mock.
struct FailingSettingsRepo {
    inner: MockRepository,
}

#[async_trait]
impl DashboardRepository for FailingSettingsRepo {
    async fn daily_task_list(&self) -> Result<Vec<DailyTask>, FetchError> {
        self.inner.daily_task_list().await
    }

    async fn daily_task_create(&self, title: &str) -> Result<DailyTask, FetchError> {
        self.inner.daily_task_create(title).await
    }

    async fn daily_task_toggle(
        &self,
        id: TaskId,
        is_completed: bool,
    ) -> Result<DailyTask, FetchError> {
        self.inner.daily_task_toggle(id, is_completed).await
    }

    async fn daily_task_delete(&self, id: TaskId) -> Result<(), FetchError> {
        self.inner.daily_task_delete(id).await
    }

    async fn project_list(&self) -> Result<Vec<Project>, FetchError> {
        self.inner.project_list().await
    }

    async fn log_create(
        &self,
        project_id: ProjectId,
        message: &str,
    ) -> Result<LogEntry, FetchError> {
        self.inner.log_create(project_id, message).await
    }

    async fn settings_get(&self) -> Result<Settings, FetchError> {
        self.inner.settings_get().await
    }

    async fn settings_update(&self, _patch: &SettingsPatch) -> Result<Settings, FetchError> {
        Err(FetchError::Status {
            status: 500,
            reason: "settings backend unavailable".to_string(),
        })
    }
}

#[tokio::test]
async fn failed_settings_save_leaves_cache_untouched() {
    let repo = Arc::new(FailingSettingsRepo {
        inner: MockRepository::seeded(),
    });
    let dashboard = Dashboard::new(repo, EngineConfig::default());

    wait_until(|| dashboard.settings.settings().is_success()).await;
    let before = dashboard.settings.settings().data.unwrap();

    let mut form = dashboard.settings.form().unwrap();
    form.telegram_threads = "9".to_string();
    let result = dashboard.settings.save(&form).await;
    assert!(matches!(result, Err(DashboardError::Fetch(_))));

    // Cached settings still serve the pre-save values.
    let snapshot = dashboard.settings.settings();
    assert_eq!(snapshot.data.unwrap(), before);

    let notifications = dashboard.notifications.take();
    assert!(notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Error));
}

proptest! {
    // A form populated from any settings is clean, and saving it back is a
    // no-op patch.
    #[test]
    fn prop_form_roundtrip_is_clean(settings in arb_settings()) {
        let form = SettingsForm::from_settings(&settings);
        prop_assert!(!form.has_changes(&settings));

        let mut applied = settings.clone();
        applied.apply(&form.to_patch());
        prop_assert_eq!(applied, settings);
    }
}
