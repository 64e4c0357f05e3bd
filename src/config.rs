use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub coingecko: CoinGeckoConfig,
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// 0 or absent disables client-side throttling
    pub requests_per_minute: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub whale_threshold: f64,
    pub hash_rate: u64,
    pub sentiment_template: String,
    pub workers: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    pub show_progress: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: PathBuf::from("users.db"),
            },
            coingecko: CoinGeckoConfig {
                base_url: "https://api.coingecko.com/api/v3".to_string(),
                timeout_ms: 10_000,
                requests_per_minute: Some(30),
            },
            analysis: AnalysisConfig {
                whale_threshold: 1000.0,
                hash_rate: 120_000_000,
                sentiment_template: "{symbol} market news today is good!".to_string(),
                workers: 20,
            },
            report: ReportConfig {
                output_path: PathBuf::from("analysis_results.csv"),
                show_progress: true,
            },
        }
    }
}

impl Settings {
    /// Defaults, then `config/default` (or `path`), then `COINSCOPE__*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("database.path", defaults.database.path.to_string_lossy().to_string())?
            .set_default("coingecko.base_url", defaults.coingecko.base_url)?
            .set_default("coingecko.timeout_ms", defaults.coingecko.timeout_ms)?
            .set_default(
                "coingecko.requests_per_minute",
                defaults.coingecko.requests_per_minute.map(u64::from),
            )?
            .set_default("analysis.whale_threshold", defaults.analysis.whale_threshold)?
            .set_default("analysis.hash_rate", defaults.analysis.hash_rate)?
            .set_default("analysis.sentiment_template", defaults.analysis.sentiment_template)?
            .set_default("analysis.workers", defaults.analysis.workers as u64)?
            .set_default(
                "report.output_path",
                defaults.report.output_path.to_string_lossy().to_string(),
            )?
            .set_default("report.show_progress", defaults.report.show_progress)?;

        builder = match path {
            Some(p) => builder.add_source(File::from(p)),
            None => builder.add_source(File::with_name("config/default").required(false)),
        };

        let config = builder
            .add_source(
                Environment::with_prefix("COINSCOPE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
