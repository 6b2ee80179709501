//! Settings panel service and form state.

use std::sync::Arc;

use opsdeck_core::{Settings, SettingsPatch};
use opsdeck_query::{Mutation, QueryCoordinator, QuerySnapshot};
use opsdeck_storage::DashboardRepository;

use crate::error::DashboardError;
use crate::keys;
use crate::notifications::Notifications;

/// Field state of the settings form.
///
/// Thread counts are kept as raw strings the way the form edits them;
/// parsing falls back to 1, so the patch sent to the backend always carries
/// valid counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub telegram_threads: String,
    pub telegram_folder_path: String,
    pub chrome_threads: String,
    pub chrome_folder_path: String,
}

impl SettingsForm {
    /// Populate the form from a settings snapshot.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            telegram_threads: settings.telegram_threads.to_string(),
            telegram_folder_path: settings.telegram_folder_path.clone(),
            chrome_threads: settings.chrome_threads.to_string(),
            chrome_folder_path: settings.chrome_folder_path.clone(),
        }
    }

    /// Structural comparison against the last-fetched snapshot: the save
    /// button stays disabled until something actually differs.
    pub fn has_changes(&self, snapshot: &Settings) -> bool {
        self.telegram_threads != snapshot.telegram_threads.to_string()
            || self.telegram_folder_path != snapshot.telegram_folder_path
            || self.chrome_threads != snapshot.chrome_threads.to_string()
            || self.chrome_folder_path != snapshot.chrome_folder_path
    }

    /// Build the PATCH body. Unparseable or zero thread counts fall back
    /// to 1.
    pub fn to_patch(&self) -> SettingsPatch {
        SettingsPatch {
            telegram_threads: Some(parse_threads(&self.telegram_threads)),
            telegram_folder_path: Some(self.telegram_folder_path.clone()),
            chrome_threads: Some(parse_threads(&self.chrome_threads)),
            chrome_folder_path: Some(self.chrome_folder_path.clone()),
        }
    }
}

fn parse_threads(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(threads) if threads >= 1 => threads,
        _ => 1,
    }
}

/// Queries and saves the settings form's backing data.
pub struct SettingsService {
    repo: Arc<dyn DashboardRepository>,
    coordinator: QueryCoordinator,
    save_mutation: Mutation,
    notifications: Arc<Notifications>,
}

impl SettingsService {
    pub fn new(
        coordinator: QueryCoordinator,
        repo: Arc<dyn DashboardRepository>,
        notifications: Arc<Notifications>,
    ) -> Self {
        Self {
            repo,
            save_mutation: Mutation::new(coordinator.clone(), vec![keys::settings()]),
            coordinator,
            notifications,
        }
    }

    /// Current settings; serves cached data immediately and refreshes in the
    /// background when stale.
    pub fn settings(&self) -> QuerySnapshot<Settings> {
        let repo = Arc::clone(&self.repo);
        self.coordinator.query(keys::settings(), move || {
            let repo = Arc::clone(&repo);
            async move { repo.settings_get().await }
        })
    }

    /// Form populated from the cached settings, if loaded.
    pub fn form(&self) -> Option<SettingsForm> {
        self.coordinator
            .snapshot::<Settings>(&keys::settings())
            .data
            .map(|settings| SettingsForm::from_settings(&settings))
    }

    /// Whether the form differs from the cached settings. False while the
    /// settings have not loaded yet.
    pub fn has_changes(&self, form: &SettingsForm) -> bool {
        self.coordinator
            .snapshot::<Settings>(&keys::settings())
            .data
            .map(|settings| form.has_changes(&settings))
            .unwrap_or(false)
    }

    pub fn is_saving(&self) -> bool {
        self.save_mutation.is_pending()
    }

    /// Save the form.
    ///
    /// On success the settings key is invalidated so readers pick up the new
    /// values; on failure the cached settings are left untouched and the
    /// error is surfaced to the caller.
    pub async fn save(&self, form: &SettingsForm) -> Result<Settings, DashboardError> {
        let patch = form.to_patch();
        patch.validate()?;

        let repo = Arc::clone(&self.repo);
        let body = patch.clone();
        let result = self
            .save_mutation
            .mutate(async move { repo.settings_update(&body).await })
            .await;

        match result {
            Ok(settings) => {
                tracing::info!("settings saved");
                self.notifications.success("Settings saved");
                Ok(settings)
            }
            Err(error) => {
                self.notifications
                    .error(format!("Failed to update settings: {error}"));
                Err(error.into())
            }
        }
    }
}
