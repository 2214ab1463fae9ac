/*!
# Voting Power

Governance weight of an account at one block. Every balance component is read
at the same block: the caller's block when given, otherwise the chain head,
looked up once before anything else.

Pools count toward voting power only when they stake the governance token;
token addresses compare case-insensitively.
*/

use crate::{config::RewardsConfig, error::SdkResult};
use async_trait::async_trait;
use campaign_rewards_cache::{CacheConfig, KeyedCache, Snapshot};
use campaign_rewards_multicall::{BlockNumberProvider, ChainId};
use futures::future::{BoxFuture, FutureExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Named balance components and their governance-weighted total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingPowerBreakdown {
    pub wallet_balance: Option<Decimal>,
    pub vault_balance: Option<Decimal>,
    pub pool_balance: Option<Decimal>,
    pub pools_balance: Option<Decimal>,
    pub lp_balance: Option<Decimal>,
    pub ifo_pool_balance: Option<Decimal>,
    pub locked_balance: Option<Decimal>,
    pub locked_end_time: Option<i64>,
    pub total: Decimal,
}

/// An active staking pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingPool {
    pub contract_address: String,
    pub staking_token_address: String,
}

/// Discovers staking pools active at a block
#[async_trait]
pub trait PoolSource: Send + Sync {
    async fn active_pools(&self, chain_id: ChainId, block: u64) -> SdkResult<Vec<StakingPool>>;
}

/// Reads balance components for an account across the given pools at a block
#[async_trait]
pub trait VotingPowerSource: Send + Sync {
    async fn voting_power(
        &self,
        account: &str,
        pool_addresses: &[String],
        block: u64,
    ) -> SdkResult<VotingPowerBreakdown>;
}

/// Contract addresses of pools staking `governance_token`, in source order
pub fn governance_pool_addresses(pools: &[StakingPool], governance_token: &str) -> Vec<String> {
    pools
        .iter()
        .filter(|pool| {
            pool.staking_token_address
                .eq_ignore_ascii_case(governance_token)
        })
        .map(|pool| pool.contract_address.clone())
        .collect()
}

/// Resolves the block, filters pools and delegates to the voting power source
pub struct VotingPowerCalculator {
    blocks: Arc<dyn BlockNumberProvider>,
    pools: Arc<dyn PoolSource>,
    source: Arc<dyn VotingPowerSource>,
    governance_token: String,
    chain_id: ChainId,
}

impl VotingPowerCalculator {
    pub fn new(
        blocks: Arc<dyn BlockNumberProvider>,
        pools: Arc<dyn PoolSource>,
        source: Arc<dyn VotingPowerSource>,
        governance_token: impl Into<String>,
        chain_id: ChainId,
    ) -> Self {
        Self {
            blocks,
            pools,
            source,
            governance_token: governance_token.into(),
            chain_id,
        }
    }

    pub fn from_config(
        config: &RewardsConfig,
        blocks: Arc<dyn BlockNumberProvider>,
        pools: Arc<dyn PoolSource>,
        source: Arc<dyn VotingPowerSource>,
    ) -> Self {
        Self::new(
            blocks,
            pools,
            source,
            config.governance_token_address.clone(),
            config.chain_id,
        )
    }

    pub async fn compute(
        &self,
        account: &str,
        block: Option<u64>,
    ) -> SdkResult<VotingPowerBreakdown> {
        let block = match block {
            Some(block) => block,
            None => self.blocks.block_number().await?,
        };

        let pools = self.pools.active_pools(self.chain_id, block).await?;
        let pool_addresses = governance_pool_addresses(&pools, &self.governance_token);
        debug!(
            "Voting power for {} at block {}: {} of {} pools eligible",
            account,
            block,
            pool_addresses.len(),
            pools.len()
        );

        self.source
            .voting_power(account, &pool_addresses, block)
            .await
    }
}

/// Voting power with loading and error flags for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct VotingPowerState {
    pub breakdown: Option<VotingPowerBreakdown>,
    pub is_loading: bool,
    pub is_error: bool,
}

impl VotingPowerState {
    fn from_snapshot(snapshot: Snapshot<VotingPowerBreakdown>) -> Self {
        Self {
            is_loading: snapshot.is_loading(),
            is_error: snapshot.is_error(),
            breakdown: snapshot.data,
        }
    }
}

type VotingPowerKey = (String, Option<u64>);

/// Voting power memoized per (account, block); entries are never refreshed
pub struct VotingPowerStore {
    calculator: Arc<VotingPowerCalculator>,
    cache: KeyedCache<VotingPowerKey, VotingPowerBreakdown>,
}

impl VotingPowerStore {
    pub fn new(calculator: Arc<VotingPowerCalculator>) -> Self {
        Self::with_cache_config(calculator, CacheConfig::immutable())
    }

    pub fn with_cache_config(calculator: Arc<VotingPowerCalculator>, config: CacheConfig) -> Self {
        Self {
            calculator,
            cache: KeyedCache::new(config),
        }
    }

    /// Voting power for `account`; without an account nothing runs
    pub async fn voting_power(&self, account: Option<&str>, block: Option<u64>) -> VotingPowerState {
        let Some(account) = account else {
            return VotingPowerState::from_snapshot(Snapshot::idle());
        };

        let calculator = Arc::clone(&self.calculator);
        let owned_account = account.to_string();
        let fetcher = move || -> BoxFuture<'static, SdkResult<VotingPowerBreakdown>> {
            let calculator = Arc::clone(&calculator);
            let account = owned_account.clone();
            async move { calculator.compute(&account, block).await }.boxed()
        };

        let snapshot = self.cache.get((account.to_string(), block), fetcher).await;
        if let Some(message) = &snapshot.error {
            error!("Failed to fetch voting power for {}: {}", account, message);
        }
        VotingPowerState::from_snapshot(snapshot)
    }

    /// Forget the cached value so the next read recomputes it
    pub fn invalidate(&self, account: &str, block: Option<u64>) -> bool {
        self.cache.invalidate(&(account.to_string(), block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(contract: &str, token: &str) -> StakingPool {
        StakingPool {
            contract_address: contract.to_string(),
            staking_token_address: token.to_string(),
        }
    }

    #[test]
    fn test_governance_pool_filter_ignores_case() {
        let pools = vec![
            pool("0xpool1", "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82"),
            pool("0xpool2", "0x1111111111111111111111111111111111111111"),
            pool("0xpool3", "0x0e09fabb73bd3ade0a17ecc321fd13a19e81ce82"),
        ];

        let addresses =
            governance_pool_addresses(&pools, "0x0e09fabb73bd3ade0a17ecc321fd13a19e81ce82");
        assert_eq!(addresses, vec!["0xpool1", "0xpool3"]);
    }

    #[test]
    fn test_governance_pool_filter_empty() {
        assert!(governance_pool_addresses(&[], "0xabc").is_empty());
    }

    #[test]
    fn test_idle_state_without_account() {
        let state = VotingPowerState::from_snapshot(Snapshot::idle());
        assert!(state.breakdown.is_none());
        assert!(state.is_loading);
        assert!(!state.is_error);
    }
}
