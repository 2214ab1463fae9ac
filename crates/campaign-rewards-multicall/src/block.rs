use crate::{MulticallError, MulticallResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Source of the current chain head block number
#[async_trait]
pub trait BlockNumberProvider: Send + Sync {
    async fn block_number(&self) -> MulticallResult<u64>;
}

#[async_trait]
impl<T: BlockNumberProvider + ?Sized> BlockNumberProvider for Arc<T> {
    async fn block_number(&self) -> MulticallResult<u64> {
        (**self).block_number().await
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorBody {
    code: i64,
    message: String,
}

/// Reads the head block with `eth_blockNumber` over HTTP JSON-RPC
pub struct JsonRpcBlockNumberProvider {
    http: reqwest::Client,
    rpc_url: Url,
}

impl JsonRpcBlockNumberProvider {
    pub fn new(rpc_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), rpc_url)
    }

    pub fn with_client(http: reqwest::Client, rpc_url: Url) -> Self {
        Self { http, rpc_url }
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }
}

#[async_trait]
impl BlockNumberProvider for JsonRpcBlockNumberProvider {
    async fn block_number(&self) -> MulticallResult<u64> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_blockNumber",
            "params": [],
        });

        let response: JsonRpcResponse = self
            .http
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let block = decode_block_response(response)?;
        debug!("Chain head at block {}", block);
        Ok(block)
    }
}

fn decode_block_response(response: JsonRpcResponse) -> MulticallResult<u64> {
    if let Some(error) = response.error {
        return Err(MulticallError::JsonRpc {
            code: error.code,
            message: error.message,
        });
    }
    let quantity = response
        .result
        .ok_or_else(|| MulticallError::InvalidBlockNumber("missing result".to_string()))?;
    parse_hex_quantity(&quantity)
}

/// Parse a JSON-RPC hex quantity such as `0x1b4`
pub fn parse_hex_quantity(quantity: &str) -> MulticallResult<u64> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .ok_or_else(|| MulticallError::InvalidBlockNumber(quantity.to_string()))?;

    if digits.is_empty() {
        return Err(MulticallError::InvalidBlockNumber(quantity.to_string()));
    }

    u64::from_str_radix(digits, 16)
        .map_err(|_| MulticallError::InvalidBlockNumber(quantity.to_string()))
}
