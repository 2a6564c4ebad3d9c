use anyhow::{Context, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = concat!("networth/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by a provider's requests.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Sends a GET request, retrying transport failures.
///
/// Only errors raised while sending are retried; any HTTP response, including
/// error statuses, is returned to the caller as-is.
///
/// # Parameters
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay`: Pause between attempts
pub async fn get_with_retry(
    client: &Client,
    url: &str,
    retries: usize,
    delay: Duration,
) -> Result<Response, reqwest::Error> {
    let mut attempt = 1;
    loop {
        match client.get(url).send().await {
            Ok(response) => return Ok(response),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} for {} failed: {}. Retrying...",
                    attempt, retries, url, err
                );
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
