//! The cache store: synchronous, per-key entry state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::entry::QueryEntry;
use crate::key::QueryKey;

/// Recover the guard from a poisoned lock.
///
/// Updates are computed read-then-insert, so a panic inside an updater leaves
/// the previous entry in place; the map itself is always consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Key-addressed store of cache entries.
///
/// All operations are synchronous and perform no I/O; each call appears
/// atomic relative to the cooperative scheduler because the internal lock is
/// only ever held for the in-memory update, never across a suspension point.
/// The store owns its entries exclusively; the coordinator mutates them only
/// through this API.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    entries: Arc<Mutex<HashMap<QueryKey, QueryEntry>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the entry for a key, if present.
    pub fn get(&self, key: &QueryKey) -> Option<QueryEntry> {
        lock(&self.entries).get(key).cloned()
    }

    /// Atomic read-modify-write of one entry.
    ///
    /// The updater receives the current entry (default-initialized when the
    /// key is absent). No cross-key atomicity is provided.
    pub fn set<F>(&self, key: &QueryKey, updater: F)
    where
        F: FnOnce(QueryEntry) -> QueryEntry,
    {
        self.modify(key, |slot| Some(updater(slot.unwrap_or_default())));
    }

    /// Atomic read-modify-write with control over entry existence.
    ///
    /// This is the primitive behind [`set`](Self::set), [`invalidate`]
    /// (Self::invalidate) and [`remove`](Self::remove): the updater receives
    /// the current entry (or `None`) and returns the entry to keep (or `None`
    /// to leave the key absent).
    pub fn modify<F>(&self, key: &QueryKey, updater: F)
    where
        F: FnOnce(Option<QueryEntry>) -> Option<QueryEntry>,
    {
        let mut entries = lock(&self.entries);
        let current = entries.get(key).cloned();
        match updater(current) {
            Some(next) => {
                entries.insert(key.clone(), next);
            }
            None => {
                entries.remove(key);
            }
        }
    }

    /// Mark an entry stale, keeping its last-known data.
    ///
    /// Returns whether an entry existed. Stale entries keep serving cached
    /// data until a refetch succeeds.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        let mut existed = false;
        self.modify(key, |slot| {
            slot.map(|mut entry| {
                existed = true;
                entry.is_stale = true;
                entry
            })
        });
        existed
    }

    /// Evict the entry for a key.
    pub fn remove(&self, key: &QueryKey) -> Option<QueryEntry> {
        lock(&self.entries).remove(key)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::QueryStatus;

    fn key() -> QueryKey {
        QueryKey::new("projects")
    }

    #[test]
    fn test_set_creates_entry() {
        let store = CacheStore::new();
        store.set(&key(), |mut entry| {
            entry.status = QueryStatus::Loading;
            entry
        });
        assert_eq!(store.get(&key()).unwrap().status, QueryStatus::Loading);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalidate_keeps_data() {
        let store = CacheStore::new();
        store.set(&key(), |mut entry| {
            entry.status = QueryStatus::Success;
            entry.data = Some(serde_json::json!([1, 2, 3]));
            entry
        });

        assert!(store.invalidate(&key()));

        let entry = store.get(&key()).unwrap();
        assert!(entry.is_stale);
        assert_eq!(entry.data, Some(serde_json::json!([1, 2, 3])));
    }

    #[test]
    fn test_invalidate_absent_key_is_noop() {
        let store = CacheStore::new();
        assert!(!store.invalidate(&key()));
        assert!(store.get(&key()).is_none());
    }

    #[test]
    fn test_remove_evicts() {
        let store = CacheStore::new();
        store.set(&key(), |entry| entry);
        assert!(store.remove(&key()).is_some());
        assert!(store.get(&key()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_modify_to_none_removes() {
        let store = CacheStore::new();
        store.set(&key(), |entry| entry);
        store.modify(&key(), |_| None);
        assert!(store.get(&key()).is_none());
    }
}
