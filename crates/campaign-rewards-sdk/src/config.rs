use campaign_rewards_api::HttpTradingRewardApi;
use campaign_rewards_multicall::{BatchConfig, ChainId, JsonRpcBlockNumberProvider};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use thiserror::Error;
use url::Url;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Endpoints, contracts and refresh settings for a deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Base URL of the trading reward REST API
    pub api_base_url: Url,

    /// JSON-RPC endpoint used for head block lookups
    pub rpc_url: Url,

    /// Chain the reward contract lives on
    #[serde(default)]
    pub chain_id: ChainId,

    /// Trading reward contract queried for claim status
    pub trading_reward_address: String,

    /// Token whose staking pools count toward voting power
    pub governance_token_address: String,

    /// Auto-refresh period for campaign data
    #[serde(default = "default_slow_refresh_interval_secs")]
    pub slow_refresh_interval_secs: u64,

    #[serde(default = "default_max_calls_per_batch")]
    pub max_calls_per_batch: usize,

    #[serde(default = "default_max_parallel_batches")]
    pub max_parallel_batches: usize,
}

impl RewardsConfig {
    /// Read and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !is_evm_address(&self.trading_reward_address) {
            return Err(ConfigError::Invalid(format!(
                "trading_reward_address is not an address: {}",
                self.trading_reward_address
            )));
        }
        if !is_evm_address(&self.governance_token_address) {
            return Err(ConfigError::Invalid(format!(
                "governance_token_address is not an address: {}",
                self.governance_token_address
            )));
        }
        if self.slow_refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "slow_refresh_interval_secs must be positive".to_string(),
            ));
        }
        self.batch_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn slow_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.slow_refresh_interval_secs)
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            max_calls_per_batch: self.max_calls_per_batch,
            max_parallel_batches: self.max_parallel_batches,
        }
    }

    pub fn trading_reward_api(&self) -> ConfigResult<HttpTradingRewardApi> {
        HttpTradingRewardApi::new(self.api_base_url.clone())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn block_number_provider(&self) -> JsonRpcBlockNumberProvider {
        JsonRpcBlockNumberProvider::new(self.rpc_url.clone())
    }
}

/// `0x` followed by 40 hex digits, any case
pub fn is_evm_address(value: &str) -> bool {
    value.len() == 42
        && (value.starts_with("0x") || value.starts_with("0X"))
        && value[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

fn default_slow_refresh_interval_secs() -> u64 {
    60
}

fn default_max_calls_per_batch() -> usize {
    BatchConfig::default().max_calls_per_batch
}

fn default_max_parallel_batches() -> usize {
    BatchConfig::default().max_parallel_batches
}
