/*!
# Campaign Rewards Multicall

Batched contract reads and chain head lookup, modelled as injectable traits so
callers can be tested against deterministic fakes.

The wire-level multicall encoding lives outside this crate: an implementation
of [`BatchCallExecutor`] takes an ABI descriptor, an ordered list of calls and
a chain id, and returns decoded outputs in the same order.

## Quick Start

```rust
use campaign_rewards_multicall::{
    Abi, BatchCallExecutor, Call, CallOptions, ChainId, ChunkedBatchExecutor, MulticallResult,
};
use std::sync::Arc;

# async fn example(transport: Arc<dyn BatchCallExecutor>) -> MulticallResult<()> {
let executor = ChunkedBatchExecutor::new(transport);
let abi = Abi::new(serde_json::json!([]));
let calls = vec![Call::new(
    "userClaimedIncentives",
    "0x0000000000000000000000000000000000000001",
    vec!["1".to_string(), "0xabc".to_string()],
)];

// Failed calls come back as `None` instead of failing the whole batch
let results = executor
    .call(&abi, &calls, ChainId::BSC, CallOptions { require_success: false })
    .await?;
assert_eq!(results.len(), calls.len());
# Ok(())
# }
```
*/

mod block;
mod client;
mod config;
mod error;
mod types;

pub use block::{parse_hex_quantity, BlockNumberProvider, JsonRpcBlockNumberProvider};
pub use client::{BatchCallExecutor, ChunkedBatchExecutor};
pub use config::BatchConfig;
pub use error::{MulticallError, MulticallResult};
pub use types::{Abi, BatchResult, Call, CallOptions, CallOutput, CallValue, ChainId};
