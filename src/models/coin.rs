use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One stored candle row from the `coins` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinRecord {
    pub symbol: String,
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Most recent close/volume for a symbol
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PricePoint {
    pub close: f64,
    pub volume: f64,
    pub time: i64,
}

impl PricePoint {
    pub fn as_pair(&self) -> (f64, f64) {
        (self.close, self.volume)
    }

    pub fn datetime(&self) -> String {
        Utc.timestamp_opt(self.time, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Invalid".to_string())
    }
}
