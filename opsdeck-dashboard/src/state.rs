//! Dashboard assembly: one engine, one repository, three panel services.

use std::sync::Arc;

use opsdeck_query::{EngineConfig, QueryCoordinator};
use opsdeck_storage::DashboardRepository;

use crate::launch::LaunchService;
use crate::notifications::Notifications;
use crate::settings::SettingsService;
use crate::tasks::TasksService;

/// The assembled dashboard data layer.
///
/// All services share one coordinator (so cache state is shared across
/// panels) and one notification queue.
pub struct Dashboard {
    pub tasks: TasksService,
    pub launch: LaunchService,
    pub settings: SettingsService,
    pub notifications: Arc<Notifications>,
    coordinator: QueryCoordinator,
}

impl Dashboard {
    pub fn new(repo: Arc<dyn DashboardRepository>, config: EngineConfig) -> Self {
        let coordinator = QueryCoordinator::new(config);
        let notifications = Arc::new(Notifications::new());
        Self {
            tasks: TasksService::new(coordinator.clone(), Arc::clone(&repo)),
            launch: LaunchService::new(
                coordinator.clone(),
                Arc::clone(&repo),
                Arc::clone(&notifications),
            ),
            settings: SettingsService::new(
                coordinator.clone(),
                Arc::clone(&repo),
                Arc::clone(&notifications),
            ),
            notifications,
            coordinator,
        }
    }

    pub fn coordinator(&self) -> &QueryCoordinator {
        &self.coordinator
    }
}
