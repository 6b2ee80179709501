//! The query coordinator: stale-while-revalidate reads, in-flight
//! deduplication, generation tracking, and subscriber notification.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use opsdeck_core::FetchError;

use crate::config::EngineConfig;
use crate::entry::{QueryEntry, QuerySnapshot, QueryStatus};
use crate::key::QueryKey;
use crate::store::{lock, CacheStore};

/// Type-erased fetcher remembered per key so invalidation can refetch
/// without the original caller present.
type ErasedFetcher = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, FetchError>> + Send + Sync>;

/// Observer callback, invoked with the entry state at the time of the
/// triggering store update.
type ObserverFn = Arc<dyn Fn(&QueryEntry) + Send + Sync>;

struct SubscriberEntry {
    id: u64,
    observer: ObserverFn,
}

/// Handle returned by [`QueryCoordinator::subscribe`]. Pass it back to
/// [`QueryCoordinator::unsubscribe`] to end the observer's interest.
#[derive(Debug)]
pub struct Subscription {
    key: QueryKey,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

struct CoordinatorInner {
    store: CacheStore,
    config: EngineConfig,
    /// Observers per key, kept in subscription order.
    subscribers: Mutex<HashMap<QueryKey, Vec<SubscriberEntry>>>,
    /// Last-registered fetcher per key, for invalidation-driven refetches.
    fetchers: Mutex<HashMap<QueryKey, ErasedFetcher>>,
    next_subscriber_id: AtomicU64,
}

/// Coordinates fetches against the cache store.
///
/// - `query` returns the current entry synchronously and starts at most one
///   background fetch when the entry is absent or stale.
/// - Concurrent queries for one key share a single fetcher invocation.
/// - Each fetch carries a per-key generation; a completion whose generation
///   is not the latest issued for the key is discarded, so a slow superseded
///   fetch can never regress the entry to older data.
/// - Subscribers are notified in subscription order after every store update
///   made by a fetch completion.
///
/// Cloning is cheap and shares all state. A tokio runtime must be current
/// when queries or invalidations trigger fetches.
#[derive(Clone)]
pub struct QueryCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl QueryCoordinator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                store: CacheStore::new(),
                config,
                subscribers: Mutex::new(HashMap::new()),
                fetchers: Mutex::new(HashMap::new()),
                next_subscriber_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// The underlying store. Exposed for inspection; entries should only be
    /// written through queries and mutations.
    pub fn store(&self) -> CacheStore {
        self.inner.store.clone()
    }

    /// Query a key, registering `fetcher` as its source of fresh data.
    ///
    /// Returns the current entry state synchronously. If the entry is absent
    /// or stale and no fetch for the key is in flight, exactly one
    /// asynchronous fetch is started; its completion updates the store and
    /// notifies subscribers.
    pub fn query<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> QuerySnapshot<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let erased: ErasedFetcher = Arc::new(move || {
            let fut = fetcher();
            async move {
                let value = fut.await?;
                serde_json::to_value(value).map_err(|e| FetchError::Codec {
                    reason: e.to_string(),
                })
            }
            .boxed()
        });
        lock(&self.inner.fetchers).insert(key.clone(), Arc::clone(&erased));

        self.maybe_fetch(&key, erased);
        self.snapshot(&key)
    }

    /// Current typed snapshot for a key without registering a fetcher or
    /// triggering a fetch.
    pub fn snapshot<T: DeserializeOwned>(&self, key: &QueryKey) -> QuerySnapshot<T> {
        match self.inner.store.get(key) {
            Some(entry) => QuerySnapshot::from_entry(&entry),
            None => QuerySnapshot::empty(),
        }
    }

    /// Register an observer for a key.
    ///
    /// Observers are invoked in subscription order on every fetch completion
    /// for the key. Subscribing does not touch the cache store, so a
    /// subscribe/unsubscribe pair with no intervening notification leaves
    /// store state unchanged.
    pub fn subscribe<F>(&self, key: QueryKey, observer: F) -> Subscription
    where
        F: Fn(&QueryEntry) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.subscribers)
            .entry(key.clone())
            .or_default()
            .push(SubscriberEntry {
                id,
                observer: Arc::new(observer),
            });
        Subscription { key, id }
    }

    /// End a subscription. Idempotent: dropping an already-removed
    /// subscription is a no-op.
    ///
    /// When the last subscriber for a key is gone, the entry is evicted
    /// after the configured GC delay unless a new subscriber arrives first.
    /// An in-flight fetch is never force-cancelled; its result is either
    /// applied to the surviving entry or discarded.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        let now_empty = {
            let mut subscribers = lock(&self.inner.subscribers);
            let mut empty = false;
            if let Some(entries) = subscribers.get_mut(&subscription.key) {
                entries.retain(|entry| entry.id != subscription.id);
                empty = entries.is_empty();
            }
            if empty {
                subscribers.remove(&subscription.key);
            }
            empty
        };
        if now_empty {
            self.schedule_gc(subscription.key.clone());
        }
    }

    /// Number of live subscribers for a key.
    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        lock(&self.inner.subscribers)
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Mark a key stale. If the key has subscribers and a known fetcher,
    /// exactly one refetch starts immediately; otherwise the entry keeps
    /// serving stale data until the next `query` call refreshes it.
    pub fn invalidate(&self, key: &QueryKey) {
        self.inner.store.invalidate(key);
        let has_subscribers = lock(&self.inner.subscribers).contains_key(key);
        let refetched = has_subscribers && self.force_fetch(key);
        tracing::debug!(key = %key, refetched, "invalidated query key");
    }

    /// Start a fetch if the entry needs one and none is outstanding.
    fn maybe_fetch(&self, key: &QueryKey, fetcher: ErasedFetcher) {
        let stale_after = self.inner.config.stale_after;
        let mut generation = None;
        self.inner.store.modify(key, |slot| {
            let mut entry = slot.unwrap_or_default();
            if !entry.in_flight && requires_refresh(&entry, stale_after) {
                entry.generation += 1;
                generation = Some(entry.generation);
                entry.in_flight = true;
                entry.status = QueryStatus::Loading;
            }
            Some(entry)
        });
        if let Some(generation) = generation {
            self.spawn_fetch(key.clone(), generation, fetcher);
        }
    }

    /// Start a fetch unconditionally, superseding any outstanding one.
    ///
    /// Returns false when no fetcher has been registered for the key.
    fn force_fetch(&self, key: &QueryKey) -> bool {
        let fetcher = match lock(&self.inner.fetchers).get(key).cloned() {
            Some(fetcher) => fetcher,
            None => return false,
        };
        let mut generation = 0;
        self.inner.store.modify(key, |slot| {
            let mut entry = slot.unwrap_or_default();
            entry.generation += 1;
            generation = entry.generation;
            entry.in_flight = true;
            entry.status = QueryStatus::Loading;
            Some(entry)
        });
        self.spawn_fetch(key.clone(), generation, fetcher);
        true
    }

    fn spawn_fetch(&self, key: QueryKey, generation: u64, fetcher: ErasedFetcher) {
        // The fetcher is invoked here so fetches observe query order; only
        // the produced future runs on the spawned task.
        let fut = fetcher();
        let inner = Arc::clone(&self.inner);
        let timeout = inner.config.fetch_timeout;
        tracing::debug!(key = %key, generation, "starting fetch");
        tokio::spawn(async move {
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        elapsed_ms: limit.as_millis() as u64,
                    }),
                },
                None => fut.await,
            };
            inner.complete_fetch(&key, generation, result);
        });
    }

    fn schedule_gc(&self, key: QueryKey) {
        let delay = self.inner.config.gc_delay;
        let inner = Arc::clone(&self.inner);
        if delay.is_zero() {
            inner.collect(&key);
            return;
        }
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.collect(&key);
        });
    }
}

impl CoordinatorInner {
    /// Apply a fetch completion to the store and notify subscribers.
    fn complete_fetch(&self, key: &QueryKey, generation: u64, result: Result<Value, FetchError>) {
        let mut updated = None;
        self.store.modify(key, |slot| match slot {
            // Entry evicted while the fetch was in flight: the result is no
            // longer required by anyone, drop it.
            None => {
                tracing::debug!(key = %key, generation, "dropping fetch result for evicted entry");
                None
            }
            Some(mut entry) => {
                if entry.generation != generation {
                    tracing::debug!(
                        key = %key,
                        generation,
                        latest = entry.generation,
                        "discarding superseded fetch result"
                    );
                    return Some(entry);
                }
                entry.in_flight = false;
                match result {
                    Ok(value) => {
                        entry.status = QueryStatus::Success;
                        entry.data = Some(value);
                        entry.error = None;
                        entry.last_updated = Some(Utc::now());
                        entry.is_stale = false;
                    }
                    Err(error) => {
                        entry.status = QueryStatus::Error;
                        entry.error = Some(error);
                        // Prior data survives a failed refetch.
                    }
                }
                updated = Some(entry.clone());
                Some(entry)
            }
        });
        if let Some(entry) = updated {
            self.notify(key, &entry);
        }
    }

    /// Invoke observers in subscription order, outside any lock.
    fn notify(&self, key: &QueryKey, entry: &QueryEntry) {
        let observers: Vec<ObserverFn> = lock(&self.subscribers)
            .get(key)
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.observer)).collect())
            .unwrap_or_default();
        for observer in observers {
            observer(entry);
        }
    }

    /// Evict a key that has stayed subscriber-free through the GC delay.
    fn collect(&self, key: &QueryKey) {
        if lock(&self.subscribers).contains_key(key) {
            return;
        }
        self.store.remove(key);
        lock(&self.fetchers).remove(key);
        tracing::debug!(key = %key, "garbage-collected query key");
    }
}

/// Whether an entry should trigger a background refresh on query.
fn requires_refresh(entry: &QueryEntry, stale_after: Option<Duration>) -> bool {
    if entry.is_stale {
        return true;
    }
    match entry.status {
        QueryStatus::Idle | QueryStatus::Error => true,
        QueryStatus::Loading => false,
        QueryStatus::Success => match (stale_after, entry.last_updated) {
            (Some(age), Some(at)) => Utc::now()
                .signed_duration_since(at)
                .to_std()
                .map(|elapsed| elapsed > age)
                .unwrap_or(false),
            _ => false,
        },
    }
}
