use crate::services::screener::ScreenerConfig;
use crate::services::EnrichmentConfig;
use crate::sources::universe::DEFAULT_CORE_SYMBOLS;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Screener configuration, read from `SCREENER_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Records kept per bucket.
    pub bucket_limit: usize,
    /// Symbols fetched concurrently.
    pub concurrency: usize,
    /// Timeout over the whole fetch-and-enrich fan-out, in seconds.
    pub timeout_secs: u64,
    /// First history lookback (e.g. "1y").
    pub primary_range: String,
    /// Lookback for the single retry (e.g. "6mo").
    pub fallback_range: String,
    /// Bar interval (e.g. "1d").
    pub interval: String,
    /// Records priced below this are dropped before ranking.
    pub min_price: f64,
    /// CSV file listing the day-trading universe.
    pub penny_csv: PathBuf,
    /// Universe used for swing and long-term buckets.
    pub core_tickers: Vec<String>,
    /// Allow randomized levels when history is unavailable.
    pub random_fallback: bool,
    /// Re-run cadence for the binary; a single run when unset.
    pub repeat_secs: Option<u64>,
    /// Directory for per-bucket JSON output.
    pub output_dir: Option<PathBuf>,
    pub enrichment: EnrichmentConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let core_tickers = env::var("SCREENER_CORE_TICKERS")
            .ok()
            .map(|s| parse_list(&s))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_CORE_SYMBOLS.iter().map(|s| s.to_string()).collect());

        Self {
            bucket_limit: parsed("SCREENER_BUCKET_LIMIT").unwrap_or(5),
            concurrency: parsed::<usize>("SCREENER_CONCURRENCY")
                .filter(|n| *n > 0)
                .unwrap_or(8),
            timeout_secs: parsed("SCREENER_TIMEOUT_SECS").unwrap_or(120),
            primary_range: env::var("SCREENER_PRIMARY_RANGE").unwrap_or_else(|_| "1y".to_string()),
            fallback_range: env::var("SCREENER_FALLBACK_RANGE")
                .unwrap_or_else(|_| "6mo".to_string()),
            interval: env::var("SCREENER_INTERVAL").unwrap_or_else(|_| "1d".to_string()),
            min_price: parsed("SCREENER_MIN_PRICE").unwrap_or(0.001),
            penny_csv: env::var("SCREENER_PENNY_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./stocks/penny_stocks.csv")),
            core_tickers,
            random_fallback: env::var("SCREENER_RANDOM_FALLBACK")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),
            repeat_secs: parsed::<u64>("SCREENER_REPEAT_SECS").filter(|s| *s > 0),
            output_dir: env::var("SCREENER_OUTPUT_DIR").ok().map(PathBuf::from),
            enrichment: EnrichmentConfig::default(),
        }
    }

    /// Settings for one [`ScreenerService`](crate::services::ScreenerService) run.
    pub fn screener(&self) -> ScreenerConfig {
        ScreenerConfig {
            bucket_limit: self.bucket_limit,
            concurrency: self.concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
            primary_range: self.primary_range.clone(),
            fallback_range: self.fallback_range.clone(),
            interval: self.interval.clone(),
            min_price: self.min_price,
            random_fallback: self.random_fallback,
            rng_seed: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Split a comma-separated symbol list, dropping blanks.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_uppercase())
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
