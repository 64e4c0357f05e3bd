mod analyzer;
mod metrics;
pub mod ratios;
mod sentiment;

pub use analyzer::CoinAnalyzer;
pub use metrics::MetricProvider;
pub use sentiment::SentimentScorer;
