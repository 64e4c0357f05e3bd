use coinscope::config::Settings;
use coinscope::store::CoinStore;
use coinscope::Pipeline;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// On-chain + sentiment analysis over locally stored coin candles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to config/default.* if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load candle rows from a CSV file into the store
    Ingest {
        csv: PathBuf,
    },

    /// Analyze a single symbol and print the result
    Analyze {
        symbol: String,
    },

    /// Analyze every stored symbol and write the CSV report
    Run {
        /// Report path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coinscope=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    info!("Configuration loaded, database: {:?}", settings.database.path);

    match args.command {
        Command::Ingest { csv } => {
            let store = CoinStore::new(&settings.database.path);
            let stats = store.ingest_csv(&csv).await?;
            println!(
                "[OK] Inserted {} records from {:?} ({} malformed rows skipped)",
                stats.inserted,
                csv,
                stats.skipped
            );
        }
        Command::Analyze { symbol } => {
            settings.report.show_progress = false;
            let pipeline = Pipeline::from_settings(&settings)?;
            let latest = pipeline.analyzer().provider().latest_price(&symbol).await;
            let r = pipeline.analyzer().analyze(&symbol).await;

            println!("\n========== {} ==========", r.symbol);
            match latest.value() {
                Some(p) => println!("{:<18} {}", "As of", p.datetime()),
                None => println!("{:<18} {}", "As of", "no stored data"),
            }
            println!("{:<18} {:>20.4}", "Price", r.price);
            println!("{:<18} {:>20.4}", "Volume", r.volume);
            println!("{:<18} {:>20.4}", "Market cap", r.market_cap);
            println!("{:<18} {:>20}", "Whale movements", r.whale_movements);
            println!("{:<18} {:>20.4}", "Exchange flow", r.exchange_flow);
            println!("{:<18} {:>20}", "Active addresses", r.active_addresses);
            println!("{:<18} {:>20}", "Tx count", r.tx_count);
            println!("{:<18} {:>20}", "Hash rate", r.hash_rate);
            println!("{:<18} {:>20.4}", "TVL", r.tvl);
            println!("{:<18} {:>20.4}", "NVT", r.nvt);
            println!("{:<18} {:>20.4}", "MVRV", r.mvrv);
            println!("{:<18} {:>20.4}", "Sentiment", r.sentiment);
            println!("{}", "=".repeat(40));
        }
        Command::Run { output, workers } => {
            if let Some(output) = output {
                settings.report.output_path = output;
            }
            if let Some(workers) = workers {
                settings.analysis.workers = workers;
            }

            let summary = Pipeline::from_settings(&settings)?.run().await?;
            println!(
                "[OK] Analysis for {}/{} coins saved to {:?}",
                summary.written, summary.symbols, summary.output
            );
            println!(
                "[INFO] Execution time: {:.2} seconds",
                summary.elapsed.as_secs_f64()
            );
        }
    }

    Ok(())
}
