/*!
# Campaign Reward Aggregation

Builds the per-campaign view a trader sees: campaign fee records and
qualification from the REST API, summed with exact decimals, plus the on-chain
claim status read in one batch per campaign.

## Batch Layout

For each campaign the batch is:

1. `userClaimedIncentives(campaignId, account)`
2. one `canClaim(campaignId, account, feeInBaseUnits)` per fee period with a
   positive fee

The batch runs with `require_success = false`; a failed `canClaim` adds nothing
to the claimable total and a failed `userClaimedIncentives` reads as `false`.

## Failure Handling

[`CampaignRewardAggregator::fetch_all_or_empty`] collapses any error into an
empty list. Callers never see partial results across campaigns.
*/

use crate::{
    amounts::{self, CLAIM_FRACTION_DIGITS, TOKEN_DECIMALS},
    config::RewardsConfig,
    error::SdkResult,
};
use campaign_rewards_api::{
    CampaignInfo, TradingFeeRecord, TradingRewardApi, UserCampaignQualification,
};
use campaign_rewards_cache::{CacheConfig, KeyedCache};
use campaign_rewards_multicall::{
    Abi, BatchCallExecutor, BatchResult, Call, CallOptions, CallValue, ChainId,
};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const USER_CLAIMED_INCENTIVES: &str = "userClaimedIncentives";
pub const CAN_CLAIM: &str = "canClaim";

/// Campaign detail, qualification and claim status for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCampaignInfoDetail {
    #[serde(flatten)]
    pub campaign: CampaignInfo,
    #[serde(flatten)]
    pub qualification: UserCampaignQualification,
    pub campaign_id: String,
    pub total_volume: Decimal,
    pub total_trading_fee: Decimal,
    #[serde(rename = "totalEstimateRewardUSD")]
    pub total_estimate_reward_usd: Decimal,
    /// Claimable amount in token base units, base 10
    pub can_claim: String,
    pub user_claimed_incentives: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_claim_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_claim_end_time: Option<i64>,
}

/// Aggregated result handed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllUserCampaignInfo {
    pub is_fetching: bool,
    pub data: Vec<UserCampaignInfoDetail>,
}

/// Exact sums over a campaign's fee records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CampaignTotals {
    pub volume: Decimal,
    pub trading_fee: Decimal,
    pub estimate_reward_usd: Decimal,
}

impl CampaignTotals {
    pub fn from_records(records: &[TradingFeeRecord]) -> SdkResult<Self> {
        Ok(Self {
            volume: amounts::sum_decimals(records.iter().map(|r| r.volume))?,
            trading_fee: amounts::sum_decimals(records.iter().map(|r| r.trading_fee))?,
            estimate_reward_usd: amounts::sum_decimals(
                records.iter().map(|r| r.estimate_reward_usd),
            )?,
        })
    }
}

/// `canClaim` reads for every fee period with a positive fee, in record order
pub fn can_claim_calls(
    trading_reward_address: &str,
    campaign_id: &str,
    account: &str,
    records: &[TradingFeeRecord],
) -> SdkResult<Vec<Call>> {
    records
        .iter()
        .filter(|record| record.trading_fee > Decimal::ZERO)
        .map(|record| {
            let amount =
                amounts::to_base_units(record.trading_fee, CLAIM_FRACTION_DIGITS, TOKEN_DECIMALS)?;
            Ok(Call::new(
                CAN_CLAIM,
                trading_reward_address,
                vec![campaign_id.to_string(), account.to_string(), amount],
            ))
        })
        .collect()
}

/// Full claim-status batch: the claimed flag first, then every `canClaim`
pub fn claim_status_calls(
    trading_reward_address: &str,
    campaign_id: &str,
    account: &str,
    records: &[TradingFeeRecord],
) -> SdkResult<Vec<Call>> {
    let mut calls = vec![Call::new(
        USER_CLAIMED_INCENTIVES,
        trading_reward_address,
        vec![campaign_id.to_string(), account.to_string()],
    )];
    calls.extend(can_claim_calls(
        trading_reward_address,
        campaign_id,
        account,
        records,
    )?);
    Ok(calls)
}

/// Sum of the `canClaim` results (entries 1..), `"0"` when there are none
pub fn claimable_total(results: &BatchResult) -> SdkResult<String> {
    if results.len() <= 1 {
        return Ok("0".to_string());
    }

    let claimable = results[1..]
        .iter()
        .filter_map(|output| output.as_ref()?.first()?.as_uint());
    Ok(amounts::sum_base_units(claimable)?)
}

/// First return value of entry 0; `false` when that read failed
pub fn claimed_incentives(results: &BatchResult) -> bool {
    results
        .first()
        .and_then(Option::as_ref)
        .and_then(|output| output.first())
        .and_then(CallValue::as_bool)
        .unwrap_or(false)
}

/// Combines the REST API and batched contract reads into per-campaign detail
pub struct CampaignRewardAggregator {
    api: Arc<dyn TradingRewardApi>,
    multicall: Arc<dyn BatchCallExecutor>,
    abi: Abi,
    trading_reward_address: String,
    chain_id: ChainId,
}

impl CampaignRewardAggregator {
    pub fn new(
        api: Arc<dyn TradingRewardApi>,
        multicall: Arc<dyn BatchCallExecutor>,
        abi: Abi,
        trading_reward_address: impl Into<String>,
        chain_id: ChainId,
    ) -> Self {
        Self {
            api,
            multicall,
            abi,
            trading_reward_address: trading_reward_address.into(),
            chain_id,
        }
    }

    pub fn from_config(
        config: &RewardsConfig,
        api: Arc<dyn TradingRewardApi>,
        multicall: Arc<dyn BatchCallExecutor>,
        abi: Abi,
    ) -> Self {
        Self::new(
            api,
            multicall,
            abi,
            config.trading_reward_address.clone(),
            config.chain_id,
        )
    }

    pub fn trading_reward_address(&self) -> &str {
        &self.trading_reward_address
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Fetch and merge everything for one campaign
    pub async fn fetch_campaign(
        &self,
        campaign_id: &str,
        account: &str,
    ) -> SdkResult<UserCampaignInfoDetail> {
        let (campaign, qualification) = futures::try_join!(
            self.api.campaign_info(campaign_id, account),
            self.api.user_qualification(campaign_id, account),
        )?;

        let totals = CampaignTotals::from_records(&campaign.trading_fee_arr)?;
        let calls = claim_status_calls(
            &self.trading_reward_address,
            campaign_id,
            account,
            &campaign.trading_fee_arr,
        )?;

        let results = self
            .multicall
            .call(
                &self.abi,
                &calls,
                self.chain_id,
                CallOptions {
                    require_success: false,
                },
            )
            .await?;

        let can_claim = claimable_total(&results)?;
        let user_claimed_incentives = claimed_incentives(&results);

        debug!(
            "Campaign {}: {} claim reads, claimable {}, claimed {}",
            campaign_id,
            calls.len() - 1,
            can_claim,
            user_claimed_incentives
        );

        Ok(UserCampaignInfoDetail {
            campaign,
            qualification,
            campaign_id: campaign_id.to_string(),
            total_volume: totals.volume,
            total_trading_fee: totals.trading_fee,
            total_estimate_reward_usd: totals.estimate_reward_usd,
            can_claim,
            user_claimed_incentives,
            campaign_claim_time: None,
            campaign_claim_end_time: None,
        })
    }

    /// Fetch every campaign concurrently; the first error fails the whole set
    pub async fn fetch_all(
        &self,
        campaign_ids: &[String],
        account: &str,
    ) -> SdkResult<Vec<UserCampaignInfoDetail>> {
        try_join_all(
            campaign_ids
                .iter()
                .map(|campaign_id| self.fetch_campaign(campaign_id, account)),
        )
        .await
    }

    /// Like [`Self::fetch_all`], but logs any error and yields an empty list
    pub async fn fetch_all_or_empty(
        &self,
        campaign_ids: &[String],
        account: &str,
    ) -> Vec<UserCampaignInfoDetail> {
        match self.fetch_all(campaign_ids, account).await {
            Ok(details) => details,
            Err(error) => {
                info!("Fetch All User Campaign Info Error: {}", error);
                Vec::new()
            }
        }
    }
}

type CampaignInfoKey = (String, Vec<String>);

/// Cached, periodically refreshed campaign info per (account, campaign ids)
pub struct CampaignInfoStore {
    aggregator: Arc<CampaignRewardAggregator>,
    cache: Arc<KeyedCache<CampaignInfoKey, Vec<UserCampaignInfoDetail>>>,
}

impl CampaignInfoStore {
    pub fn new(aggregator: Arc<CampaignRewardAggregator>, refresh_interval: Duration) -> Self {
        Self {
            aggregator,
            cache: Arc::new(KeyedCache::new(CacheConfig::interval(refresh_interval))),
        }
    }

    pub fn from_config(config: &RewardsConfig, aggregator: Arc<CampaignRewardAggregator>) -> Self {
        Self::new(aggregator, config.slow_refresh_interval())
    }

    /// Campaign info for `account`, served from cache while fresh
    ///
    /// Without an account or campaign ids nothing is fetched.
    pub async fn all_user_campaign_info(
        &self,
        campaign_ids: &[String],
        account: Option<&str>,
    ) -> AllUserCampaignInfo {
        let Some(key) = cache_key(campaign_ids, account) else {
            return AllUserCampaignInfo::default();
        };

        let fetcher = self.fetcher(&key);
        let snapshot = self.cache.get(key, fetcher).await;
        AllUserCampaignInfo {
            is_fetching: snapshot.is_fetching(),
            data: snapshot.data.unwrap_or_default(),
        }
    }

    /// Current cached state without fetching
    pub fn peek(&self, campaign_ids: &[String], account: Option<&str>) -> AllUserCampaignInfo {
        let Some(key) = cache_key(campaign_ids, account) else {
            return AllUserCampaignInfo::default();
        };

        let snapshot = self.cache.peek(&key);
        AllUserCampaignInfo {
            is_fetching: snapshot.is_fetching(),
            data: snapshot.data.unwrap_or_default(),
        }
    }

    /// Start refreshing this (account, campaign ids) pair on the refresh interval
    pub fn watch(&self, campaign_ids: &[String], account: Option<&str>) -> Option<JoinHandle<()>> {
        let key = cache_key(campaign_ids, account)?;
        let fetcher = self.fetcher(&key);
        self.cache.watch(key, fetcher)
    }

    pub fn invalidate(&self, campaign_ids: &[String], account: &str) -> bool {
        self.cache
            .invalidate(&(account.to_string(), campaign_ids.to_vec()))
    }

    fn fetcher(
        &self,
        key: &CampaignInfoKey,
    ) -> impl Fn() -> futures::future::BoxFuture<'static, Result<Vec<UserCampaignInfoDetail>, Infallible>>
           + Send
           + Sync
           + 'static {
        use futures::FutureExt;

        let aggregator = Arc::clone(&self.aggregator);
        let (account, campaign_ids) = key.clone();
        move || {
            let aggregator = Arc::clone(&aggregator);
            let account = account.clone();
            let campaign_ids = campaign_ids.clone();
            async move {
                Ok(aggregator
                    .fetch_all_or_empty(&campaign_ids, &account)
                    .await)
            }
            .boxed()
        }
    }
}

fn cache_key(campaign_ids: &[String], account: Option<&str>) -> Option<CampaignInfoKey> {
    match account {
        Some(account) if !campaign_ids.is_empty() => {
            Some((account.to_string(), campaign_ids.to_vec()))
        }
        _ => None,
    }
}
