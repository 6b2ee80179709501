//! Cache entry state and typed snapshots.

use opsdeck_core::{FetchError, Timestamp};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Lifecycle status of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    /// No fetch has been issued for this key yet.
    #[default]
    Idle,
    /// A fetch is running; previously cached data (if any) is still served.
    Loading,
    /// The last fetch succeeded.
    Success,
    /// The last fetch failed; previously cached data (if any) is still served.
    Error,
}

/// Cached state for one key.
///
/// Data is stored type-erased as JSON so entries of different resource types
/// can share one store; typed access goes through [`QueryEntry::decode`] or
/// [`QuerySnapshot`].
///
/// Invariants maintained by the coordinator:
/// - `status == Success` implies `data` is present and `error` is absent.
/// - `status == Error` implies `error` is present; prior `data` is retained.
/// - At most one in-flight fetch per key; `generation` tags the latest
///   issued fetch so superseded completions can be discarded.
#[derive(Debug, Clone, Default)]
pub struct QueryEntry {
    pub status: QueryStatus,
    pub data: Option<Value>,
    pub error: Option<FetchError>,
    pub last_updated: Option<Timestamp>,
    /// Set by `invalidate`; cleared when a fetch succeeds.
    pub is_stale: bool,
    /// Latest fetch generation issued for this key.
    pub generation: u64,
    /// Whether the latest-generation fetch is still outstanding.
    pub in_flight: bool,
}

impl QueryEntry {
    /// Decode the cached value into its concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>, FetchError> {
        match &self.data {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| FetchError::Codec {
                    reason: e.to_string(),
                }),
        }
    }
}

/// Typed view of a cache entry, handed to query callers.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<FetchError>,
    pub last_updated: Option<Timestamp>,
    pub is_stale: bool,
}

impl<T> QuerySnapshot<T> {
    /// Snapshot of a key that has no entry yet.
    pub fn empty() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            last_updated: None,
            is_stale: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

impl<T: DeserializeOwned> QuerySnapshot<T> {
    /// Build a typed snapshot from an erased entry.
    ///
    /// A payload that fails to decode is reported as a codec error rather
    /// than panicking; the erased entry itself is left untouched.
    pub fn from_entry(entry: &QueryEntry) -> Self {
        match entry.decode::<T>() {
            Ok(data) => Self {
                status: entry.status,
                data,
                error: entry.error.clone(),
                last_updated: entry.last_updated,
                is_stale: entry.is_stale,
            },
            Err(codec) => Self {
                status: QueryStatus::Error,
                data: None,
                error: Some(codec),
                last_updated: entry.last_updated,
                is_stale: entry.is_stale,
            },
        }
    }
}
