//! Secondary rate provider in the open exchange-rate API shape. Covers many
//! more currencies than the primary but only serves the latest rates.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{CurrencyPair, CurrencyRateProvider, RateDate};
use crate::providers::util::{get_with_retry, http_client};

pub const DEFAULT_BASE_URL: &str = "https://open.er-api.com/v6";

pub struct OpenExchangeRateProvider {
    base_url: String,
    client: Client,
    retries: usize,
}

impl OpenExchangeRateProvider {
    pub fn new(base_url: &str, timeout: Duration, retries: usize) -> Result<Self> {
        Ok(OpenExchangeRateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
            retries,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

#[async_trait]
impl CurrencyRateProvider for OpenExchangeRateProvider {
    /// Always answers with the latest rates; a historical `date` is approximated.
    #[instrument(name = "OpenErRateFetch", skip(self), fields(pair = %pair, date = %date))]
    async fn get_rate(&self, pair: &CurrencyPair, date: RateDate) -> Result<f64> {
        if let RateDate::On(day) = date {
            debug!("Historical rate for {} requested, serving latest instead", day);
        }

        let url = format!("{}/latest/{}", self.base_url, pair.base());
        debug!("Requesting currency rate from {}", url);

        let response = get_with_retry(&self.client, &url, self.retries, Duration::from_millis(250))
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}", e, pair))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                pair
            ));
        }

        let text = response.text().await?;
        let data: LatestResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", pair, e))?;

        if data.result != "success" {
            return Err(anyhow!(
                "Provider error: {} for currency pair: {}",
                data.error_type.as_deref().unwrap_or("unknown"),
                pair
            ));
        }

        data.rates
            .get(pair.quote())
            .copied()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", pair))
    }

    fn name(&self) -> &str {
        "open-er"
    }
}
