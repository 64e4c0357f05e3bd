use crate::analysis::{CoinAnalyzer, MetricProvider, SentimentScorer};
use crate::api::CoinGeckoClient;
use crate::config::Settings;
use crate::error::Result;
use crate::models::{AnalysisResult, RunSummary};
use crate::output::CsvWriter;
use crate::store::CoinStore;

use futures::{stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Fans analysis out over every stored symbol and writes the report.
pub struct Pipeline {
    store: CoinStore,
    analyzer: Arc<CoinAnalyzer>,
    workers: usize,
    output: PathBuf,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(store: CoinStore, analyzer: CoinAnalyzer, workers: usize, output: PathBuf) -> Self {
        Self {
            store,
            analyzer: Arc::new(analyzer),
            workers: workers.max(1),
            output,
            show_progress: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = CoinStore::new(&settings.database.path);
        let provider = MetricProvider::new(
            store.clone(),
            CoinGeckoClient::new(settings.coingecko.clone())?,
            settings.analysis.whale_threshold,
        );
        let scorer = SentimentScorer::vader(settings.analysis.sentiment_template.clone());
        let analyzer = CoinAnalyzer::new(provider, scorer, settings.analysis.hash_rate);

        Ok(Self::new(
            store,
            analyzer,
            settings.analysis.workers,
            settings.report.output_path.clone(),
        )
        .with_progress(settings.report.show_progress))
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn analyzer(&self) -> &CoinAnalyzer {
        &self.analyzer
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }

    /// Analyzes every symbol in the store. Results arrive in completion order.
    pub async fn collect(&self) -> Result<Vec<AnalysisResult>> {
        let symbols = self.store.distinct_symbols().await?;
        Ok(self.analyze_symbols(symbols).await)
    }

    /// At most `workers` analyses in flight; a worker that panics drops its row.
    pub async fn analyze_symbols(&self, symbols: Vec<String>) -> Vec<AnalysisResult> {
        info!(
            "Analyzing {} symbols with {} workers...",
            symbols.len(),
            self.workers
        );

        let pb = self.progress_bar(symbols.len());

        let results: Vec<AnalysisResult> = stream::iter(symbols)
            .map(|symbol| {
                let analyzer = self.analyzer.clone();
                let pb = pb.clone();

                async move {
                    let result = tokio::spawn(async move { analyzer.analyze(&symbol).await }).await;
                    pb.inc(1);
                    match result {
                        Ok(r) => Some(r),
                        Err(e) => {
                            warn!("Analysis worker failed: {}", e);
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.workers)
            .filter_map(|r| async move { r })
            .collect()
            .await;

        pb.finish_with_message("Done!");
        results
    }

    /// Full run: analyze every symbol, then overwrite the report.
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();

        let discovered = self.store.distinct_symbols().await?;
        let symbols = discovered.len();
        let results = self.analyze_symbols(discovered).await;

        let mut writer = CsvWriter::new(&self.output)?;
        writer.write_results(&results)?;
        writer.flush()?;

        let summary = RunSummary {
            symbols,
            written: results.len(),
            output: self.output.clone(),
            elapsed: start.elapsed(),
        };

        info!(
            "Analysis for {} coins saved to {:?}",
            summary.written, summary.output
        );
        info!("Execution time: {:.2} seconds", summary.elapsed.as_secs_f64());

        Ok(summary)
    }
}
