//! OPSDECK Query - Key-Addressed Asynchronous Cache
//!
//! A standalone query/cache engine, decoupled from any rendering mechanism:
//! observers request data by key, the engine serves cached state immediately
//! and refreshes it in the background, and write operations invalidate the
//! keys they affect.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      QueryCoordinator                         │
//! │   dedup · generations · subscriptions · timeout · GC         │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                               │
//! │   ┌──────────────┐    ┌──────────────┐    ┌──────────────┐   │
//! │   │  CacheStore  │    │   Fetchers   │    │   Mutation   │   │
//! │   │ per-key entry│    │ user-supplied│    │ write + fan- │   │
//! │   │    state     │    │ async fns    │    │ out invalidate│  │
//! │   └──────────────┘    └──────────────┘    └──────────────┘   │
//! │                                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Concurrent queries for equal keys share one fetcher invocation.
//! - A failed refetch never erases previously cached data.
//! - Invalidating a key with live subscribers starts exactly one refetch.
//! - Fetches carry per-key generations; superseded completions are dropped,
//!   so a slow stale response can never overwrite fresher data.
//! - Subscribers are notified in subscription order.
//!
//! # Example
//!
//! ```ignore
//! let coordinator = QueryCoordinator::new(EngineConfig::default());
//! let key = QueryKey::new("projects");
//!
//! // Serve cached state, refresh in the background.
//! let snapshot = coordinator.query(key.clone(), move || {
//!     let repo = Arc::clone(&repo);
//!     async move { repo.project_list().await }
//! });
//!
//! // Writes invalidate; subscribed keys refetch immediately.
//! let create_log = Mutation::new(coordinator.clone(), vec![key]);
//! create_log.mutate(async move { repo.log_create(project_id, "msg").await }).await?;
//! ```

pub mod config;
pub mod coordinator;
pub mod entry;
pub mod key;
pub mod mutation;
pub mod store;

pub use config::EngineConfig;
pub use coordinator::{QueryCoordinator, Subscription};
pub use entry::{QueryEntry, QuerySnapshot, QueryStatus};
pub use key::QueryKey;
pub use mutation::{Mutation, MutationStatus};
pub use store::CacheStore;
