//! OPSDECK Dashboard - panel services over the query engine.
//!
//! Mirrors the dashboard's three panels: a launch panel, a daily-task
//! checklist, and a settings form. Each service wires the injected
//! repository through the query coordinator with its invalidation keys, and
//! raises transient notifications instead of touching any rendering layer.

pub mod error;
pub mod keys;
pub mod launch;
pub mod notifications;
pub mod persistence;
pub mod settings;
pub mod sidebar;
pub mod state;
pub mod tasks;

pub use error::DashboardError;
pub use launch::{LaunchRequest, LaunchService};
pub use notifications::{Notification, NotificationLevel, Notifications};
pub use settings::{SettingsForm, SettingsService};
pub use sidebar::{Sidebar, SidebarState};
pub use state::Dashboard;
pub use tasks::TasksService;
