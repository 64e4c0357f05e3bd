use super::CoinStore;
use crate::error::Result;
use crate::models::{CoinRecord, IngestStats};

use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Parses candle rows, dropping any row that fails to deserialize.
/// Returns the good rows and the number skipped.
pub fn read_records<R: Read>(reader: R) -> Result<(Vec<CoinRecord>, usize)> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0;

    for (line, row) in rdr.deserialize::<CoinRecord>().enumerate() {
        match row {
            Ok(record) if !record.symbol.is_empty() => records.push(record),
            Ok(_) => skipped += 1,
            Err(e) => {
                debug!("Skipping row {}: {}", line + 2, e);
                skipped += 1;
            }
        }
    }

    Ok((records, skipped))
}

impl CoinStore {
    pub async fn ingest_csv(&self, csv_path: &Path) -> Result<IngestStats> {
        let file = std::fs::File::open(csv_path)?;
        let (records, skipped) = read_records(file)?;

        self.ensure_schema().await?;
        let inserted = self.insert_records(&records).await?;

        let stats = IngestStats {
            read: records.len() + skipped,
            skipped,
            inserted,
        };
        info!(
            "Ingested {:?}: {} rows read, {} skipped, {} inserted",
            csv_path, stats.read, stats.skipped, stats.inserted
        );
        Ok(stats)
    }
}
