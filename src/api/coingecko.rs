use crate::config::CoinGeckoConfig;
use crate::error::{AppError, Result};

use super::RateLimiter;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct CoinGeckoClient {
    client: reqwest::Client,
    config: CoinGeckoConfig,
    rate_limiter: RateLimiter,
}

impl CoinGeckoClient {
    /// Fails rather than falling back to a client without the per-call timeout.
    pub fn new(config: CoinGeckoConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("coinscope/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let rate_limiter = RateLimiter::new(config.requests_per_minute);
        debug!(
            "CoinGecko client: timeout {}ms, rate limited: {}",
            config.timeout_ms,
            rate_limiter.is_limited()
        );

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        self.rate_limiter.acquire().await;

        let url = format!("{}{}", self.base_url(), path);
        debug!("GET {}", url);

        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::CoinGeckoApi(format!(
                "Status {}: {}",
                status, text
            )));
        }

        Ok(response.json().await?)
    }

    /// Twitter follower count from `/coins/{id}`, used as an active-address proxy.
    pub async fn twitter_followers(&self, symbol: &str) -> Result<u64> {
        let id = symbol.to_lowercase();
        let body: Value = self.get_json(&format!("/coins/{}", id), &[]).await?;

        body.get("community_data")
            .and_then(|c| c.get("twitter_followers"))
            .and_then(as_u64_lossy)
            .ok_or_else(|| {
                AppError::MalformedPayload(format!("no community_data.twitter_followers for {}", id))
            })
    }

    /// Reported 24h trading volume from `/coins/markets`, used as a transaction-count proxy.
    pub async fn total_volume(&self, symbol: &str) -> Result<u64> {
        let id = symbol.to_lowercase();
        let body: Vec<Value> = self
            .get_json("/coins/markets", &[("vs_currency", "usd"), ("ids", id.as_str())])
            .await?;

        body.first()
            .and_then(|m| m.get("total_volume"))
            .and_then(as_u64_lossy)
            .ok_or_else(|| AppError::MalformedPayload(format!("no market entry for {}", id)))
    }

    /// Total value locked from the `/defi/tvl` listing, matched by lowercase id.
    pub async fn tvl(&self, symbol: &str) -> Result<f64> {
        let id = symbol.to_lowercase();
        let body: Vec<Value> = self.get_json("/defi/tvl", &[]).await?;

        body.iter()
            .find(|entry| {
                entry
                    .get("id")
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase() == id)
            })
            .and_then(|entry| entry.get("tvl"))
            .and_then(as_f64_lossy)
            .ok_or_else(|| AppError::MalformedPayload(format!("no tvl entry for {}", id)))
    }
}

/// Accepts integers, floats (truncated) and numeric strings.
fn as_u64_lossy(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64),
        _ => None,
    }
}

fn as_f64_lossy(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
