//! Primary rate provider serving ECB reference rates in the Frankfurter API
//! shape. It quotes a fixed set of major currencies, both latest and historical.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::currency::{CurrencyPair, CurrencyRateProvider, RateDate};
use crate::providers::util::{get_with_retry, http_client};

pub const DEFAULT_BASE_URL: &str = "https://api.frankfurter.app";

/// Currencies published in the ECB reference rate set.
pub const SUPPORTED_CURRENCIES: [&str; 31] = [
    "AUD", "BGN", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HUF", "IDR",
    "ILS", "INR", "ISK", "JPY", "KRW", "MXN", "MYR", "NOK", "NZD", "PHP", "PLN", "RON", "SEK",
    "SGD", "THB", "TRY", "USD", "ZAR",
];

pub struct FrankfurterProvider {
    base_url: String,
    client: Client,
    retries: usize,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, timeout: Duration, retries: usize) -> Result<Self> {
        Ok(FrankfurterProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(timeout)?,
            retries,
        })
    }

    fn url_for(&self, pair: &CurrencyPair, date: RateDate) -> String {
        let endpoint = match date {
            RateDate::Latest => "latest".to_string(),
            RateDate::On(day) => day.format("%Y-%m-%d").to_string(),
        };
        format!(
            "{}/{}?from={}&to={}",
            self.base_url,
            endpoint,
            pair.base(),
            pair.quote()
        )
    }
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&code)
}

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl CurrencyRateProvider for FrankfurterProvider {
    #[instrument(name = "FrankfurterRateFetch", skip(self), fields(pair = %pair, date = %date))]
    async fn get_rate(&self, pair: &CurrencyPair, date: RateDate) -> Result<f64> {
        let url = self.url_for(pair, date);
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
        let data: FrankfurterResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", pair, e))?;

        data.rates
            .get(pair.quote())
            .copied()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", pair))
    }

    fn name(&self) -> &str {
        "frankfurter"
    }

    fn supports(&self, pair: &CurrencyPair) -> bool {
        is_supported(pair.base()) && is_supported(pair.quote())
    }
}
