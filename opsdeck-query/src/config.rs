//! Engine configuration.

use std::time::Duration;

/// Configuration for the query coordinator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Optional per-fetch timeout; a timed-out fetch is treated as a fetch
    /// failure and does not affect other in-flight generations.
    pub fetch_timeout: Option<Duration>,
    /// Age after which a successful entry is considered stale and a new
    /// `query` call triggers a background refresh. `None` means entries stay
    /// fresh until explicitly invalidated.
    pub stale_after: Option<Duration>,
    /// How long an entry survives after its last subscriber is gone. Zero
    /// means immediate eviction.
    pub gc_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: None,
            stale_after: None,
            gc_delay: Duration::from_secs(300),
        }
    }
}

impl EngineConfig {
    /// Create a new engine config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Set the staleness age for successful entries.
    pub fn with_stale_after(mut self, age: Duration) -> Self {
        self.stale_after = Some(age);
        self
    }

    /// Set the garbage-collection delay after the last unsubscribe.
    pub fn with_gc_delay(mut self, delay: Duration) -> Self {
        self.gc_delay = delay;
        self
    }
}
