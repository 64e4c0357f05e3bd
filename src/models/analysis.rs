use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Report column order. Field order of [`AnalysisResult`] must match.
pub const REPORT_COLUMNS: [&str; 13] = [
    "symbol",
    "price",
    "volume",
    "market_cap",
    "whale_movements",
    "exchange_flow",
    "active_addresses",
    "tx_count",
    "hash_rate",
    "tvl",
    "nvt",
    "mvrv",
    "sentiment",
];

/// One report row: on-chain and sentiment figures for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub market_cap: f64,
    pub whale_movements: u64,
    pub exchange_flow: f64,
    pub active_addresses: u64,
    pub tx_count: u64,
    pub hash_rate: u64,
    pub tvl: f64,
    pub nvt: f64,
    pub mvrv: f64,
    pub sentiment: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub read: usize,
    pub skipped: usize,
    pub inserted: u64,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub symbols: usize,
    pub written: usize,
    pub output: PathBuf,
    pub elapsed: Duration,
}
