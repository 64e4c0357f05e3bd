mod ingest;

use crate::error::Result;
use crate::models::{CoinRecord, PricePoint};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::PathBuf;
use std::time::Duration;

const CREATE_COINS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS coins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol TEXT NOT NULL,
    time INTEGER NOT NULL,
    open REAL,
    high REAL,
    low REAL,
    close REAL,
    volume REAL,
    UNIQUE(symbol, time)
)
"#;

const INSERT_OR_IGNORE: &str = r#"
INSERT OR IGNORE INTO coins (symbol, time, open, high, low, close, volume)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

/// SQLite-backed candle store.
///
/// Holds only the database path. Every query opens its own connection and
/// closes it before returning, so concurrent workers never share a handle.
#[derive(Debug, Clone)]
pub struct CoinStore {
    path: PathBuf,
}

impl CoinStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Never creates the file; a missing database surfaces as an error.
    async fn connect_read(&self) -> Result<SqliteConnection> {
        let conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .busy_timeout(Duration::from_secs(30))
            .connect()
            .await?;
        Ok(conn)
    }

    async fn connect_write(&self) -> Result<SqliteConnection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let conn = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(30))
            .connect()
            .await?;
        Ok(conn)
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        let mut conn = self.connect_write().await?;
        sqlx::query(CREATE_COINS_TABLE).execute(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }

    /// Inserts rows in one transaction; rows whose (symbol, time) already exist are ignored.
    /// Returns the number of rows actually inserted.
    pub async fn insert_records(&self, records: &[CoinRecord]) -> Result<u64> {
        let mut conn = self.connect_write().await?;
        let mut tx = conn.begin().await?;
        let mut inserted = 0;

        for r in records {
            let done = sqlx::query(INSERT_OR_IGNORE)
                .bind(&r.symbol)
                .bind(r.time)
                .bind(r.open)
                .bind(r.high)
                .bind(r.low)
                .bind(r.close)
                .bind(r.volume)
                .execute(&mut *tx)
                .await?;
            inserted += done.rows_affected();
        }

        tx.commit().await?;
        conn.close().await?;
        Ok(inserted)
    }

    pub async fn distinct_symbols(&self) -> Result<Vec<String>> {
        let mut conn = self.connect_read().await?;
        let symbols = sqlx::query_scalar::<_, String>("SELECT DISTINCT symbol FROM coins ORDER BY symbol")
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;
        Ok(symbols)
    }

    /// Most recent record by time, `None` when the symbol has no rows.
    pub async fn latest_price(&self, symbol: &str) -> Result<Option<PricePoint>> {
        let mut conn = self.connect_read().await?;
        let row = sqlx::query_as::<_, (Option<f64>, Option<f64>, i64)>(
            "SELECT close, volume, time FROM coins WHERE symbol = ? ORDER BY time DESC LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&mut conn)
        .await?;
        conn.close().await?;

        Ok(row.map(|(close, volume, time)| PricePoint {
            close: close.unwrap_or(0.0),
            volume: volume.unwrap_or(0.0),
            time,
        }))
    }

    /// Number of rows for `symbol` with volume >= `threshold`.
    pub async fn whale_movements(&self, symbol: &str, threshold: f64) -> Result<u64> {
        let mut conn = self.connect_read().await?;
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM coins WHERE symbol = ? AND volume >= ?",
        )
        .bind(symbol)
        .bind(threshold)
        .fetch_one(&mut conn)
        .await?;
        conn.close().await?;
        Ok(count.max(0) as u64)
    }

    /// Sum of volume across every row for `symbol`; 0.0 when there are none.
    pub async fn exchange_flow(&self, symbol: &str) -> Result<f64> {
        let mut conn = self.connect_read().await?;
        // TOTAL() is 0.0 on an empty set where SUM() would be NULL
        let total = sqlx::query_scalar::<_, f64>("SELECT TOTAL(volume) FROM coins WHERE symbol = ?")
            .bind(symbol)
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;
        Ok(total)
    }
}
