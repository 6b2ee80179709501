//! OPSDECK Core - Entity Types
//!
//! Pure data structures with no behavior beyond construction, validation,
//! and patch merging. All other crates depend on this.

pub mod entities;
pub mod error;
pub mod identity;

pub use entities::{DailyTask, LogEntry, Project, Settings, SettingsPatch};
pub use error::{FetchError, OpsdeckError, OpsdeckResult, ValidationError};
pub use identity::{new_entity_id, EntityId, LogId, ProjectId, TaskId, Timestamp};
