use campaign_rewards_cache::{CacheConfig, ExponentialBackoff, FetchStatus, KeyedCache};
use futures::{future::BoxFuture, FutureExt};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::sync::Notify;
use tokio_test::{assert_pending, assert_ready, task};

/// Fetcher returning the call number, after an optional delay
fn counting_fetcher(
    calls: Arc<AtomicUsize>,
    delay: Duration,
) -> impl Fn() -> BoxFuture<'static, Result<usize, String>> + Send + Sync + 'static {
    move || {
        let calls = calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(n)
        }
        .boxed()
    }
}

/// Fetcher that resolves to `value` once `gate` is notified
fn gated_fetcher(
    value: usize,
    calls: Arc<AtomicUsize>,
    gate: Arc<Notify>,
) -> impl Fn() -> BoxFuture<'static, Result<usize, String>> + Send + Sync + 'static {
    move || {
        let calls = calls.clone();
        let gate = gate.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            gate.notified().await;
            Ok(value)
        }
        .boxed()
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_gets_share_one_fetch() {
    let cache: KeyedCache<&'static str, usize> = KeyedCache::new(CacheConfig::immutable());
    let calls = Arc::new(AtomicUsize::new(0));

    let (a, b) = tokio::join!(
        cache.get("k", counting_fetcher(calls.clone(), Duration::from_millis(50))),
        cache.get("k", counting_fetcher(calls.clone(), Duration::from_millis(50))),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.data, Some(1));
    assert_eq!(b.data, Some(1));
    assert_eq!(a.status, FetchStatus::Fetched);
    assert_eq!(b.status, FetchStatus::Fetched);
}

#[tokio::test]
async fn test_immutable_entry_never_refetched_until_invalidated() {
    let cache: KeyedCache<u32, usize> = KeyedCache::new(CacheConfig::immutable());
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let snapshot = cache
            .get(7, counting_fetcher(calls.clone(), Duration::ZERO))
            .await;
        assert_eq!(snapshot.data, Some(1));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(cache.invalidate(&7));
    assert!(!cache.invalidate(&7));

    let snapshot = cache
        .get(7, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;
    assert_eq!(snapshot.data, Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_distinct_keys_fetch_independently() {
    let cache: KeyedCache<u32, usize> = KeyedCache::new(CacheConfig::immutable());
    let calls = Arc::new(AtomicUsize::new(0));

    cache
        .get(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;
    cache
        .get(2, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
    cache.clear();
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_interval_entry_refetched_after_expiry() {
    let cache: KeyedCache<u32, usize> =
        KeyedCache::new(CacheConfig::interval(Duration::from_secs(60)));
    let calls = Arc::new(AtomicUsize::new(0));

    let first = cache
        .get(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;
    assert_eq!(first.data, Some(1));

    tokio::time::advance(Duration::from_secs(30)).await;
    let cached = cache
        .get(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;
    assert_eq!(cached.data, Some(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    let refreshed = cache
        .get(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;
    assert_eq!(refreshed.data, Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_stale_data() {
    let cache: KeyedCache<u32, usize> =
        KeyedCache::new(CacheConfig::interval(Duration::from_secs(10)));

    cache.get(1, || async { Ok::<_, String>(5) }).await;
    tokio::time::advance(Duration::from_secs(11)).await;

    let snapshot = cache
        .get(1, || async { Err::<usize, _>("upstream down".to_string()) })
        .await;
    assert_eq!(snapshot.data, Some(5));
    assert_eq!(snapshot.status, FetchStatus::Failed);
    assert_eq!(snapshot.error.as_deref(), Some("upstream down"));
    assert!(snapshot.is_error());

    // A failed entry is retried on the next read
    let snapshot = cache.get(1, || async { Ok::<_, String>(6) }).await;
    assert_eq!(snapshot.data, Some(6));
    assert_eq!(snapshot.status, FetchStatus::Fetched);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_first_failure_without_retry_has_no_data() {
    let cache: KeyedCache<u32, usize> = KeyedCache::new(CacheConfig::immutable());
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let snapshot = cache
        .get(1, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err::<usize, _>("nope") }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(snapshot.data.is_none());
    assert!(snapshot.is_error());
    assert!(snapshot.is_loading());
}

#[tokio::test]
async fn test_error_retry_recovers() {
    let backoff = ExponentialBackoff {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(5),
        max_elapsed_time: Some(Duration::from_secs(5)),
        ..Default::default()
    };
    let cache: KeyedCache<u32, usize> =
        KeyedCache::new(CacheConfig::immutable().with_error_retry(backoff));
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let snapshot = cache
        .get(1, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(format!("attempt {} failed", n))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(snapshot.data, Some(3));
    assert_eq!(snapshot.status, FetchStatus::Fetched);
}

#[tokio::test]
async fn test_error_retry_gives_up() {
    let backoff = ExponentialBackoff {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(2),
        max_elapsed_time: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let cache: KeyedCache<u32, usize> =
        KeyedCache::new(CacheConfig::immutable().with_error_retry(backoff));

    let snapshot = cache
        .get(1, || async { Err::<usize, _>("always failing") })
        .await;

    assert!(snapshot.is_error());
    assert_eq!(snapshot.error.as_deref(), Some("always failing"));
}

#[tokio::test]
async fn test_revalidate_ignores_freshness() {
    let cache: KeyedCache<u32, usize> = KeyedCache::new(CacheConfig::immutable());
    let calls = Arc::new(AtomicUsize::new(0));

    cache
        .get(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;
    let snapshot = cache
        .revalidate(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;

    assert_eq!(snapshot.data, Some(2));
    assert_eq!(cache.peek(&1).data, Some(2));
}

#[tokio::test]
async fn test_peek_missing_key_is_idle() {
    let cache: KeyedCache<u32, usize> = KeyedCache::new(CacheConfig::immutable());
    let snapshot = cache.peek(&1);
    assert_eq!(snapshot.status, FetchStatus::Idle);
    assert!(snapshot.data.is_none());
    assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_watch_refreshes_on_interval() {
    let cache: Arc<KeyedCache<u32, usize>> = Arc::new(KeyedCache::new(CacheConfig::interval(
        Duration::from_secs(10),
    )));
    let calls = Arc::new(AtomicUsize::new(0));

    let handle = cache
        .watch(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .expect("interval policy spawns a refresher");

    // Ticks at 0s, 10s and 20s
    tokio::time::sleep(Duration::from_secs(25)).await;
    handle.abort();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.peek(&1).data, Some(3));
}

#[tokio::test]
async fn test_watch_is_noop_for_immutable() {
    let cache: Arc<KeyedCache<u32, usize>> =
        Arc::new(KeyedCache::new(CacheConfig::immutable()));
    let calls = Arc::new(AtomicUsize::new(0));

    assert!(cache
        .watch(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_second_get_joins_in_flight_fetch() {
    let cache: KeyedCache<&'static str, usize> = KeyedCache::new(CacheConfig::immutable());
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());

    let mut first = task::spawn(cache.get("k", gated_fetcher(1, calls.clone(), gate.clone())));
    assert_pending!(first.poll());
    assert!(cache.peek(&"k").is_fetching());

    let mut second = task::spawn(cache.get("k", gated_fetcher(2, calls.clone(), gate.clone())));
    assert_pending!(second.poll());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    gate.notify_one();
    assert!(first.is_woken());

    let a = assert_ready!(first.poll());
    let b = assert_ready!(second.poll());
    assert_eq!(a.data, Some(1));
    assert_eq!(b.data, Some(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_superseded_fetch_returns_its_own_result() {
    let cache: KeyedCache<&'static str, usize> = KeyedCache::new(CacheConfig::immutable());
    let calls = Arc::new(AtomicUsize::new(0));
    let old_gate = Arc::new(Notify::new());
    let new_gate = Arc::new(Notify::new());

    let mut old = task::spawn(cache.get("k", gated_fetcher(1, calls.clone(), old_gate.clone())));
    assert_pending!(old.poll());

    assert!(cache.invalidate(&"k"));
    let mut new = task::spawn(cache.get("k", gated_fetcher(2, calls.clone(), new_gate.clone())));
    assert_pending!(new.poll());
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    old_gate.notify_one();
    let snapshot = assert_ready!(old.poll());
    assert_eq!(snapshot.data, Some(1));
    assert_eq!(snapshot.status, FetchStatus::Fetched);

    // The stale result never lands in the replacing entry
    let current = cache.peek(&"k");
    assert!(current.is_fetching());
    assert!(current.data.is_none());

    new_gate.notify_one();
    let snapshot = assert_ready!(new.poll());
    assert_eq!(snapshot.data, Some(2));
    assert_eq!(cache.peek(&"k").data, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_max_entries_evicts_oldest_settled_key() {
    let cache: KeyedCache<u32, usize> =
        KeyedCache::new(CacheConfig::immutable().with_max_entries(2));
    let calls = Arc::new(AtomicUsize::new(0));

    for key in [1, 2, 3] {
        cache
            .get(key, counting_fetcher(calls.clone(), Duration::ZERO))
            .await;
        tokio::time::advance(Duration::from_secs(1)).await;
    }

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.peek(&1).status, FetchStatus::Idle);
    assert_eq!(cache.peek(&2).data, Some(2));
    assert_eq!(cache.peek(&3).data, Some(3));

    // Re-reading an evicted key fetches again and pushes out the next oldest
    let snapshot = cache
        .get(1, counting_fetcher(calls.clone(), Duration::ZERO))
        .await;
    assert_eq!(snapshot.data, Some(4));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.peek(&2).status, FetchStatus::Idle);
}
