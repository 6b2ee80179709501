//! Error types for OPSDECK operations

use thiserror::Error;
use uuid::Uuid;

/// Fetch layer errors.
///
/// Raised by fetchers and mutation operations when the upstream source
/// (HTTP backend or repository) fails. These errors are captured into cache
/// entry / mutation state, never thrown into an observer's control flow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport failure: {reason}")]
    Transport { reason: String },

    #[error("Upstream returned status {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: Uuid },

    #[error("Fetch timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Codec error: {reason}")]
    Codec { reason: String },
}

/// Validation errors.
///
/// Raised synchronously before any fetch or mutation I/O is issued. A failed
/// validation means the operation was never started.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Unified error type across the workspace.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OpsdeckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type OpsdeckResult<T> = std::result::Result<T, OpsdeckError>;
