use crate::api::CoinGeckoClient;
use crate::error::Result;
use crate::models::{Metric, PricePoint};
use crate::store::CoinStore;

use std::fmt::Display;
use tracing::warn;

/// Raw per-symbol facts from the candle store and the market-data API.
///
/// Every lookup is soft: failures are logged and come back as
/// [`Metric::Unavailable`] rather than as errors.
pub struct MetricProvider {
    store: CoinStore,
    coingecko: CoinGeckoClient,
    whale_threshold: f64,
}

fn soften<T>(what: &str, symbol: &str, result: Result<T>) -> Metric<T> {
    soften_with(what, symbol, result.map(Metric::Value))
}

fn soften_with<T, E: Display>(
    what: &str,
    symbol: &str,
    result: std::result::Result<Metric<T>, E>,
) -> Metric<T> {
    match result {
        Ok(m) => m,
        Err(e) => {
            warn!("{} unavailable for {}: {}", what, symbol, e);
            Metric::Unavailable
        }
    }
}

impl MetricProvider {
    pub fn new(store: CoinStore, coingecko: CoinGeckoClient, whale_threshold: f64) -> Self {
        Self {
            store,
            coingecko,
            whale_threshold,
        }
    }

    /// Latest stored close/volume. Absent symbols are `Unavailable`, i.e. (0, 0).
    pub async fn latest_price(&self, symbol: &str) -> Metric<PricePoint> {
        let result = self.store.latest_price(symbol).await.map(Metric::from);
        soften_with("latest price", symbol, result)
    }

    pub async fn whale_movements(&self, symbol: &str) -> Metric<u64> {
        self.whale_movements_above(symbol, self.whale_threshold).await
    }

    pub async fn whale_movements_above(&self, symbol: &str, threshold: f64) -> Metric<u64> {
        soften(
            "whale movements",
            symbol,
            self.store.whale_movements(symbol, threshold).await,
        )
    }

    pub async fn exchange_flow(&self, symbol: &str) -> Metric<f64> {
        soften("exchange flow", symbol, self.store.exchange_flow(symbol).await)
    }

    pub async fn active_addresses(&self, symbol: &str) -> Metric<u64> {
        soften(
            "active addresses",
            symbol,
            self.coingecko.twitter_followers(symbol).await,
        )
    }

    pub async fn tx_count(&self, symbol: &str) -> Metric<u64> {
        soften("tx count", symbol, self.coingecko.total_volume(symbol).await)
    }

    pub async fn tvl(&self, symbol: &str) -> Metric<f64> {
        soften("tvl", symbol, self.coingecko.tvl(symbol).await)
    }
}
