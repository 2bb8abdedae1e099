//! HTTP client for the chain gateway's transaction endpoint.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::chain::{ChainApiError, ChainStatusApi};
use crate::config::NetworkConfig;

/// REST client for the gateway's transaction status endpoint.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: url::Url,
}

/// One record of the gateway's transactions listing.
#[derive(Debug, Deserialize)]
struct TransactionRecord {
    #[serde(rename = "txHash")]
    tx_hash: String,
    status: String,
}

impl GatewayClient {
    /// Create a client from network configuration.
    pub fn new(config: &NetworkConfig) -> Result<Self, ChainApiError> {
        let base_url: url::Url = config
            .gateway_url
            .parse()
            .map_err(|e| ChainApiError::InvalidUrl(format!("'{}': {}", config.gateway_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        tracing::info!(
            gateway_url = %base_url,
            timeout_secs = config.request_timeout_secs,
            "gateway client initialized"
        );

        Ok(Self { http, base_url })
    }

    fn statuses_url(&self, hashes: &[String]) -> Result<url::Url, ChainApiError> {
        let mut url = self
            .base_url
            .join("transactions")
            .map_err(|e| ChainApiError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("hashes", &hashes.join(","))
            .append_pair("fields", "txHash,status");
        Ok(url)
    }
}

#[async_trait]
impl ChainStatusApi for GatewayClient {
    async fn transaction_statuses(
        &self,
        hashes: &[String],
    ) -> Result<HashMap<String, String>, ChainApiError> {
        if hashes.is_empty() {
            return Ok(HashMap::new());
        }

        let url = self.statuses_url(hashes)?;
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ChainApiError::UnexpectedResponse(format!(
                "status {}",
                response.status()
            )));
        }

        let records: Vec<TransactionRecord> = response.json().await?;

        Ok(records
            .into_iter()
            .map(|record| (record.tx_hash, record.status))
            .collect())
    }
}
