mod analysis;
mod coin;
mod metric;

pub use analysis::{AnalysisResult, IngestStats, RunSummary, REPORT_COLUMNS};
pub use coin::{CoinRecord, PricePoint};
pub use metric::Metric;
