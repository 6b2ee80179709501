//! One-shot write operations that invalidate cache keys on success.

use std::future::Future;
use std::sync::{Arc, Mutex};

use opsdeck_core::FetchError;

use crate::coordinator::QueryCoordinator;
use crate::key::QueryKey;
use crate::store::lock;

/// Status of the most recent run of a mutation.
///
/// Mirrors a cache entry's status shape, but mutation state is held by the
/// mutation itself and never enters the cache store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

struct MutationInner {
    coordinator: QueryCoordinator,
    invalidates: Vec<QueryKey>,
    status: Mutex<MutationStatus>,
}

/// A reusable write operation bound to the keys it invalidates.
///
/// On success every bound key is invalidated; keys with live subscribers
/// refetch immediately. On failure the error is surfaced to the caller only
/// and no cache entry is touched. Concurrent runs are not serialized here;
/// callers that need exclusive writes must serialize themselves.
#[derive(Clone)]
pub struct Mutation {
    inner: Arc<MutationInner>,
}

impl Mutation {
    pub fn new(coordinator: QueryCoordinator, invalidates: Vec<QueryKey>) -> Self {
        Self {
            inner: Arc::new(MutationInner {
                coordinator,
                invalidates,
                status: Mutex::new(MutationStatus::Idle),
            }),
        }
    }

    pub fn status(&self) -> MutationStatus {
        *lock(&self.inner.status)
    }

    pub fn is_pending(&self) -> bool {
        self.status() == MutationStatus::Pending
    }

    /// Keys invalidated when a run succeeds.
    pub fn invalidates(&self) -> &[QueryKey] {
        &self.inner.invalidates
    }

    /// Run the write operation.
    pub async fn mutate<T, Fut>(&self, operation: Fut) -> Result<T, FetchError>
    where
        Fut: Future<Output = Result<T, FetchError>>,
    {
        *lock(&self.inner.status) = MutationStatus::Pending;
        let result = operation.await;
        match &result {
            Ok(_) => {
                *lock(&self.inner.status) = MutationStatus::Success;
                for key in &self.inner.invalidates {
                    self.inner.coordinator.invalidate(key);
                }
            }
            Err(error) => {
                *lock(&self.inner.status) = MutationStatus::Error;
                tracing::debug!(error = %error, "mutation failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::time::Duration;

    fn key() -> QueryKey {
        QueryKey::new("daily_tasks")
    }

    #[tokio::test]
    async fn test_status_transitions_on_success() {
        let coordinator = QueryCoordinator::new(EngineConfig::default());
        let mutation = Mutation::new(coordinator, vec![key()]);
        assert_eq!(mutation.status(), MutationStatus::Idle);

        let result = mutation.mutate(async { Ok::<_, FetchError>(7u32) }).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(mutation.status(), MutationStatus::Success);
    }

    #[tokio::test]
    async fn test_status_transitions_on_failure() {
        let coordinator = QueryCoordinator::new(EngineConfig::default());
        let mutation = Mutation::new(coordinator, vec![key()]);

        let result = mutation
            .mutate(async {
                Err::<u32, _>(FetchError::Transport {
                    reason: "connection reset".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(mutation.status(), MutationStatus::Error);
    }

    #[tokio::test]
    async fn test_is_pending_while_running() {
        let coordinator = QueryCoordinator::new(EngineConfig::default());
        let mutation = Mutation::new(coordinator, vec![]);

        let observed = mutation.clone();
        let run = tokio::spawn(async move {
            observed
                .mutate(async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<_, FetchError>(())
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(mutation.is_pending());

        run.await.unwrap().unwrap();
        assert_eq!(mutation.status(), MutationStatus::Success);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_store_untouched() {
        let coordinator = QueryCoordinator::new(EngineConfig::default());
        let store = coordinator.store();
        let mutation = Mutation::new(coordinator, vec![key()]);

        store.set(&key(), |mut entry| {
            entry.data = Some(serde_json::json!(["keep me"]));
            entry
        });

        let _ = mutation
            .mutate(async {
                Err::<(), _>(FetchError::Status {
                    status: 500,
                    reason: "boom".to_string(),
                })
            })
            .await;

        let entry = store.get(&key()).unwrap();
        assert!(!entry.is_stale);
        assert_eq!(entry.data, Some(serde_json::json!(["keep me"])));
    }
}
