/*!
# Trading Reward API Client

HTTP implementation of [`TradingRewardApi`] over the campaign and user endpoints.
*/

use crate::{
    errors::{ApiError, ApiResult},
    types::{ApiResponse, CampaignInfo, UserCampaignQualification},
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Per-account campaign data served by the trading reward API
#[async_trait]
pub trait TradingRewardApi: Send + Sync {
    /// `GET {base}/campaign/campaignId/{id}/address/{account}`
    async fn campaign_info(&self, campaign_id: &str, account: &str) -> ApiResult<CampaignInfo>;

    /// `GET {base}/user/campaignId/{id}/address/{account}`
    async fn user_qualification(
        &self,
        campaign_id: &str,
        account: &str,
    ) -> ApiResult<UserCampaignQualification>;
}

#[async_trait]
impl<T: TradingRewardApi + ?Sized> TradingRewardApi for Arc<T> {
    async fn campaign_info(&self, campaign_id: &str, account: &str) -> ApiResult<CampaignInfo> {
        (**self).campaign_info(campaign_id, account).await
    }

    async fn user_qualification(
        &self,
        campaign_id: &str,
        account: &str,
    ) -> ApiResult<UserCampaignQualification> {
        (**self).user_qualification(campaign_id, account).await
    }
}

/// reqwest-backed client for the trading reward API
pub struct HttpTradingRewardApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpTradingRewardApi {
    /// Create new client with a default HTTP client
    pub fn new(base_url: Url) -> ApiResult<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create new client sharing an existing HTTP client
    pub fn with_client(http: reqwest::Client, base_url: Url) -> ApiResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfig(format!(
                "API base URL cannot carry a path: {}",
                base_url
            )));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn campaign_info_url(&self, campaign_id: &str, account: &str) -> ApiResult<Url> {
        self.endpoint(&["campaign", "campaignId", campaign_id, "address", account])
    }

    pub fn user_qualification_url(&self, campaign_id: &str, account: &str) -> ApiResult<Url> {
        self.endpoint(&["user", "campaignId", campaign_id, "address", account])
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::InvalidConfig(format!(
                    "API base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_data<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        let envelope: ApiResponse<T> =
            serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl TradingRewardApi for HttpTradingRewardApi {
    async fn campaign_info(&self, campaign_id: &str, account: &str) -> ApiResult<CampaignInfo> {
        let url = self.campaign_info_url(campaign_id, account)?;
        self.get_data(url).await
    }

    async fn user_qualification(
        &self,
        campaign_id: &str,
        account: &str,
    ) -> ApiResult<UserCampaignQualification> {
        let url = self.user_qualification_url(campaign_id, account)?;
        self.get_data(url).await
    }
}
