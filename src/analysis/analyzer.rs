use super::ratios::{market_cap, mvrv, nvt, round_to};
use super::{MetricProvider, SentimentScorer};
use crate::models::AnalysisResult;

use tracing::debug;

const DISPLAY_DIGITS: i32 = 4;

pub struct CoinAnalyzer {
    provider: MetricProvider,
    scorer: SentimentScorer,
    hash_rate: u64,
}

impl CoinAnalyzer {
    pub fn new(provider: MetricProvider, scorer: SentimentScorer, hash_rate: u64) -> Self {
        Self {
            provider,
            scorer,
            hash_rate,
        }
    }

    pub fn provider(&self) -> &MetricProvider {
        &self.provider
    }

    /// Builds one result row for `symbol`. Never fails: every unavailable
    /// input has already collapsed to zero.
    pub async fn analyze(&self, symbol: &str) -> AnalysisResult {
        let (price, volume) = self.provider.latest_price(symbol).await.unwrap_or_default().as_pair();
        let whale_movements = self.provider.whale_movements(symbol).await.unwrap_or_default();
        let exchange_flow = self.provider.exchange_flow(symbol).await.unwrap_or_default();
        let active_addresses = self.provider.active_addresses(symbol).await.unwrap_or_default();
        let tx_count = self.provider.tx_count(symbol).await.unwrap_or_default();
        let tvl = self.provider.tvl(symbol).await.unwrap_or_default();

        let market_cap = market_cap(price, volume);
        let nvt = nvt(market_cap, volume);
        // realized cap stand-in: no on-chain source for it yet
        let mvrv = mvrv(market_cap, volume);

        let sentiment = self.scorer.score_symbol(symbol);

        debug!(
            "{}: price={} volume={} whales={} flow={}",
            symbol, price, volume, whale_movements, exchange_flow
        );

        AnalysisResult {
            symbol: symbol.to_string(),
            price: round_to(price, DISPLAY_DIGITS),
            volume: round_to(volume, DISPLAY_DIGITS),
            market_cap: round_to(market_cap, DISPLAY_DIGITS),
            whale_movements,
            exchange_flow: round_to(exchange_flow, DISPLAY_DIGITS),
            active_addresses,
            tx_count,
            hash_rate: self.hash_rate,
            tvl: round_to(tvl, DISPLAY_DIGITS),
            nvt: round_to(nvt, DISPLAY_DIGITS),
            mvrv: round_to(mvrv, DISPLAY_DIGITS),
            sentiment: round_to(sentiment, DISPLAY_DIGITS),
        }
    }
}
