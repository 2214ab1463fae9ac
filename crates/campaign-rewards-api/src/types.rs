/*!
# API Data Types

Response shapes of the trading reward REST API. Amounts are exact decimals and
accept either JSON numbers or strings.
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Envelope every endpoint wraps its payload in
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Trading activity and estimated reward for one fee period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradingFeeRecord {
    pub origin: Option<String>,
    pub volume: Decimal,
    pub trading_fee: Decimal,
    #[serde(rename = "estimateRewardUSD")]
    pub estimate_reward_usd: Decimal,
    pub quote_volume: Option<Decimal>,
}

/// Campaign detail for one account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignInfo {
    pub total: Option<u64>,
    pub trading_fee_arr: Vec<TradingFeeRecord>,
}

/// Whether an account qualifies for a campaign, and the lock thresholds it is held to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserCampaignQualification {
    pub id: String,
    pub is_active: bool,
    pub lock_start_time: i64,
    pub lock_end_time: i64,
    pub locked_amount: Decimal,
    pub created_at: String,
    pub is_qualified: bool,
    pub threshold_locked_period: i64,
    pub threshold_locked_amount: String,
    pub needs_profile_activated: bool,
}
