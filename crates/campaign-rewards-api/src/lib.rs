/*!
# Campaign Rewards API

Client for the trading reward REST API: per-account campaign detail (fee
records per period) and per-account qualification for a campaign.

## Usage

```rust
use campaign_rewards_api::{ApiResult, HttpTradingRewardApi, TradingRewardApi};
use url::Url;

async fn example() -> ApiResult<()> {
    let base = Url::parse("https://rewards.example.com/api/v1")?;
    let api = HttpTradingRewardApi::new(base)?;

    let campaign = api.campaign_info("1", "0xabc").await?;
    println!("{} fee periods", campaign.trading_fee_arr.len());

    let user = api.user_qualification("1", "0xabc").await?;
    println!("qualified: {}", user.is_qualified);
    Ok(())
}
```
*/

pub mod client;
pub mod errors;
pub mod types;

pub use client::{HttpTradingRewardApi, TradingRewardApi};
pub use errors::{ApiError, ApiResult};
pub use types::{ApiResponse, CampaignInfo, TradingFeeRecord, UserCampaignQualification};
