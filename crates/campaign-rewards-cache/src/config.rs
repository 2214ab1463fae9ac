use backoff::ExponentialBackoff;
use std::time::Duration;

/// When a resolved entry goes stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Entries are refetched once older than the interval
    Interval(Duration),
    /// A resolved entry is never refetched until it is invalidated
    Immutable,
}

/// Configuration for a [`crate::KeyedCache`]
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Staleness policy for resolved entries
    pub refresh: RefreshPolicy,

    /// Backoff for retrying failed fetches; `None` reports the first failure
    pub error_retry: Option<ExponentialBackoff>,

    /// Upper bound on cached keys; `None` keeps every key until `invalidate` or `clear`
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    pub fn interval(period: Duration) -> Self {
        Self {
            refresh: RefreshPolicy::Interval(period),
            error_retry: None,
            max_entries: None,
        }
    }

    pub fn immutable() -> Self {
        Self {
            refresh: RefreshPolicy::Immutable,
            error_retry: None,
            max_entries: None,
        }
    }

    pub fn with_error_retry(mut self, backoff: ExponentialBackoff) -> Self {
        self.error_retry = Some(backoff);
        self
    }

    /// Evict the least recently fetched settled key once `max_entries` are cached
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }
}

/// Exponential retry schedule used when callers opt into error retries
pub fn default_error_retry() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_secs(5),
        max_interval: Duration::from_secs(60),
        max_elapsed_time: Some(Duration::from_secs(300)),
        multiplier: 2.0,
        ..Default::default()
    }
}
