//! Error types for the dashboard services.

use opsdeck_core::{FetchError, ValidationError};

use crate::persistence::PersistenceError;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
