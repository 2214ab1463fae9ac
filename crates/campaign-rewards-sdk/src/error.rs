use crate::{amounts::AmountError, config::ConfigError};
use campaign_rewards_api::ApiError;
use campaign_rewards_multicall::MulticallError;
use thiserror::Error;

pub type SdkResult<T> = Result<T, SdkError>;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("On-chain read error: {0}")]
    Multicall(#[from] MulticallError),

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pool discovery failed: {0}")]
    PoolDiscovery(String),

    #[error("Voting power lookup failed: {0}")]
    VotingPower(String),
}
