/*!
# Campaign Rewards Cache

Keyed async cache used to front network reads.

- **De-duplication**: concurrent requests for one key share a single fetch
- **Refresh policies**: interval-based staleness or immutable entries
- **Stale on error**: a failed refresh keeps the last good value
- **Error retry**: optional exponential backoff around each fetch

## Usage

```rust
use campaign_rewards_cache::{CacheConfig, KeyedCache};
use std::time::Duration;

# async fn example() {
let cache: KeyedCache<String, u64> = KeyedCache::new(CacheConfig::interval(Duration::from_secs(60)));

let snapshot = cache
    .get("head".to_string(), || async { Ok::<_, std::io::Error>(42) })
    .await;
assert_eq!(snapshot.data, Some(42));
assert!(!snapshot.is_loading());
# }
```
*/

mod cache;
mod config;
mod snapshot;

pub use cache::KeyedCache;
pub use config::{default_error_retry, CacheConfig, RefreshPolicy};
pub use snapshot::{FetchStatus, Snapshot};

// Re-export for callers building retry schedules
pub use backoff::ExponentialBackoff;
