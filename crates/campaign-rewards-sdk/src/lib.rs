/*!
# Campaign Rewards SDK

Trading campaign reward aggregation and governance voting power on top of the
REST API, batched contract reads and the keyed cache.

## Usage

```rust,no_run
use campaign_rewards_sdk::{
    Abi, BatchCallExecutor, CampaignInfoStore, CampaignRewardAggregator, RewardsConfig, SdkResult,
};
use std::sync::Arc;

# async fn example(multicall: Arc<dyn BatchCallExecutor>) -> SdkResult<()> {
let config = RewardsConfig::load("rewards.yaml")?;
let api = Arc::new(config.trading_reward_api()?);
let abi = Abi::new(serde_json::json!([]));

let aggregator = Arc::new(CampaignRewardAggregator::from_config(&config, api, multicall, abi));
let store = CampaignInfoStore::from_config(&config, aggregator);

let campaigns = vec!["1".to_string(), "2".to_string()];
let info = store.all_user_campaign_info(&campaigns, Some("0xabc")).await;
for detail in &info.data {
    println!("{}: claimable {}", detail.campaign_id, detail.can_claim);
}
# Ok(())
# }
```
*/

pub mod amounts;
pub mod campaign_info;
pub mod config;
pub mod error;
pub mod voting_power;

pub use campaign_info::{
    AllUserCampaignInfo, CampaignInfoStore, CampaignRewardAggregator, CampaignTotals,
    UserCampaignInfoDetail,
};
pub use config::{ConfigError, ConfigResult, RewardsConfig};
pub use error::{SdkError, SdkResult};
pub use voting_power::{
    PoolSource, StakingPool, VotingPowerBreakdown, VotingPowerCalculator, VotingPowerSource,
    VotingPowerState, VotingPowerStore,
};

// Re-export collaborator seams so callers need only this crate
pub use campaign_rewards_api::{
    CampaignInfo, HttpTradingRewardApi, TradingFeeRecord, TradingRewardApi,
    UserCampaignQualification,
};
pub use campaign_rewards_multicall::{
    Abi, BatchCallExecutor, BlockNumberProvider, Call, CallOptions, CallValue, ChainId,
    ChunkedBatchExecutor,
};
