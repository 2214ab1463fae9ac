use crate::{CacheConfig, FetchStatus, RefreshPolicy, Snapshot};
use backoff::{future::retry, ExponentialBackoff};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::{
    collections::HashMap,
    fmt::Display,
    future::Future,
    hash::Hash,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, String>>>;

/// Unique across all caches so a fetch started before an invalidation can never
/// settle into the entry that replaced it.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

struct Entry<V> {
    data: Option<V>,
    status: FetchStatus,
    error: Option<String>,
    fetched_at: Option<Instant>,
    in_flight: Option<(u64, SharedFetch<V>)>,
    settled_generation: Option<u64>,
}

impl<V: Clone> Entry<V> {
    fn new() -> Self {
        Self {
            data: None,
            status: FetchStatus::Idle,
            error: None,
            fetched_at: None,
            in_flight: None,
            settled_generation: None,
        }
    }

    fn is_fresh(&self, policy: &RefreshPolicy) -> bool {
        if self.status != FetchStatus::Fetched {
            return false;
        }
        match (policy, self.fetched_at) {
            (RefreshPolicy::Immutable, _) => true,
            (RefreshPolicy::Interval(period), Some(fetched_at)) => fetched_at.elapsed() < *period,
            (RefreshPolicy::Interval(_), None) => false,
        }
    }

    fn is_settled(&self) -> bool {
        self.in_flight.is_none()
    }

    fn snapshot(&self) -> Snapshot<V> {
        Snapshot {
            data: self.data.clone(),
            status: self.status,
            error: self.error.clone(),
        }
    }
}

/// Async cache keyed by request identity
///
/// Concurrent requests for the same key share one fetch. Resolved entries are
/// served until the [`RefreshPolicy`] marks them stale. Keys are kept until
/// invalidated unless [`CacheConfig::max_entries`] bounds the map.
pub struct KeyedCache<K, V> {
    config: CacheConfig,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached value for `key`, fetching it when missing or stale
    pub async fn get<F, Fut, E>(&self, key: K, fetcher: F) -> Snapshot<V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.resolve(key, fetcher, false).await
    }

    /// Fetch `key` even when the cached value is still fresh
    pub async fn revalidate<F, Fut, E>(&self, key: K, fetcher: F) -> Snapshot<V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.resolve(key, fetcher, true).await
    }

    /// Current state of `key` without fetching
    pub fn peek(&self, key: &K) -> Snapshot<V> {
        self.lock()
            .get(key)
            .map(Entry::snapshot)
            .unwrap_or_else(Snapshot::idle)
    }

    /// Drop `key`; the next `get` fetches again. Returns whether it was cached.
    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Spawn a task that revalidates `key` every refresh interval
    ///
    /// Returns `None` under [`RefreshPolicy::Immutable`]. Abort the handle to stop.
    pub fn watch<F, Fut, E>(self: &Arc<Self>, key: K, fetcher: F) -> Option<JoinHandle<()>>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let RefreshPolicy::Interval(period) = self.config.refresh else {
            return None;
        };

        let cache = Arc::clone(self);
        let fetcher = Arc::new(fetcher);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let fetcher = Arc::clone(&fetcher);
                let snapshot = cache.revalidate(key.clone(), move || (*fetcher)()).await;
                if let Some(error) = &snapshot.error {
                    warn!("Background refresh failed: {}", error);
                }
            }
        }))
    }

    async fn resolve<F, Fut, E>(&self, key: K, fetcher: F, force: bool) -> Snapshot<V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let (generation, fetch) = {
            let mut entries = self.lock();
            if !entries.contains_key(&key) {
                if let Some(max_entries) = self.config.max_entries {
                    evict_to_fit(&mut entries, max_entries);
                }
            }
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);

            if let Some(joined) = entry.in_flight.clone() {
                debug!("Joining in-flight fetch {}", joined.0);
                joined
            } else if !force && entry.is_fresh(&self.config.refresh) {
                return entry.snapshot();
            } else {
                let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
                let fetch = run_fetch(fetcher, self.config.error_retry.clone())
                    .boxed()
                    .shared();
                entry.in_flight = Some((generation, fetch.clone()));
                entry.status = FetchStatus::Fetching;
                (generation, fetch)
            }
        };

        let outcome = fetch.await;
        self.settle(&key, generation, outcome)
    }

    fn settle(&self, key: &K, generation: u64, outcome: Result<V, String>) -> Snapshot<V> {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            // Invalidated while in flight
            return outcome_snapshot(outcome);
        };

        let owns_fetch = matches!(&entry.in_flight, Some((current, _)) if *current == generation);
        if !owns_fetch {
            if entry.settled_generation == Some(generation) {
                // Another caller of the same fetch already settled the entry
                return entry.snapshot();
            }
            // Superseded by a newer fetch; this caller still gets its own result
            return outcome_snapshot(outcome);
        }

        entry.in_flight = None;
        entry.settled_generation = Some(generation);
        match outcome {
            Ok(value) => {
                entry.data = Some(value);
                entry.status = FetchStatus::Fetched;
                entry.error = None;
                entry.fetched_at = Some(Instant::now());
            }
            Err(error) => {
                entry.status = FetchStatus::Failed;
                entry.error = Some(error);
            }
        }

        entry.snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn outcome_snapshot<V>(outcome: Result<V, String>) -> Snapshot<V> {
    match outcome {
        Ok(value) => Snapshot {
            data: Some(value),
            status: FetchStatus::Fetched,
            error: None,
        },
        Err(error) => Snapshot {
            data: None,
            status: FetchStatus::Failed,
            error: Some(error),
        },
    }
}

/// Drop settled keys, least recently fetched first, until a new key fits
///
/// Keys with a fetch in flight are never evicted, so the map may briefly exceed
/// `max_entries` while many fetches run.
fn evict_to_fit<K, V>(entries: &mut HashMap<K, Entry<V>>, max_entries: usize)
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    while entries.len() >= max_entries.max(1) {
        let victim = entries
            .iter()
            .filter(|(_, entry)| entry.is_settled())
            .min_by_key(|(_, entry)| entry.fetched_at)
            .map(|(key, _)| key.clone());

        let Some(victim) = victim else {
            return;
        };
        debug!("Evicting cached entry to stay within {} keys", max_entries);
        entries.remove(&victim);
    }
}

async fn run_fetch<F, Fut, V, E>(
    fetcher: F,
    error_retry: Option<ExponentialBackoff>,
) -> Result<V, String>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let Some(backoff) = error_retry else {
        return fetcher().await.map_err(|e| e.to_string());
    };

    retry(backoff, || {
        let attempt = fetcher();
        async move {
            attempt.await.map_err(|e| {
                warn!("Fetch attempt failed: {}", e);
                backoff::Error::transient(e.to_string())
            })
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_interval_entry_goes_stale() {
        let mut entry: Entry<u32> = Entry::new();
        let policy = RefreshPolicy::Interval(Duration::from_secs(10));
        assert!(!entry.is_fresh(&policy));

        entry.status = FetchStatus::Fetched;
        entry.fetched_at = Some(Instant::now());
        assert!(entry.is_fresh(&policy));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(!entry.is_fresh(&policy));
        assert!(entry.is_fresh(&RefreshPolicy::Immutable));
    }

    #[test]
    fn test_failed_entry_is_never_fresh() {
        let mut entry: Entry<u32> = Entry::new();
        entry.status = FetchStatus::Failed;
        entry.data = Some(1);
        assert!(!entry.is_fresh(&RefreshPolicy::Immutable));
    }
}
