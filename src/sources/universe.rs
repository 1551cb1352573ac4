//! Static and file-backed ticker universes.

use super::TickerUniverse;
use crate::error::{Result, ScreenerError};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Large-cap symbols screened when no other list is configured.
pub const DEFAULT_CORE_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "NVDA", "GOOGL", "AMZN", "TSLA", "BRK.B", "META", "UNH", "JNJ", "PG", "XOM",
    "CVX", "WMT", "PFE", "V", "MA", "KO", "PEP", "ABBV",
];

/// Fixed, ordered list of symbols.
pub struct StaticUniverse {
    name: String,
    symbols: Vec<String>,
}

impl StaticUniverse {
    pub fn new(name: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            symbols,
        }
    }

    pub fn core() -> Self {
        Self::new(
            "core",
            DEFAULT_CORE_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

#[async_trait]
impl TickerUniverse for StaticUniverse {
    fn name(&self) -> &str {
        &self.name
    }

    async fn symbols(&self) -> Result<Vec<String>> {
        Ok(self.symbols.clone())
    }
}

/// Symbols read from the first column of a CSV file with a header row.
pub struct CsvUniverse {
    name: String,
    path: PathBuf,
}

impl CsvUniverse {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Extract the first column of every data row, skipping the header and blanks.
fn parse_first_column(content: &str) -> Vec<String> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let first = line.split(',').next()?.trim().trim_matches('"').trim();
            if first.is_empty() {
                None
            } else {
                Some(first.to_string())
            }
        })
        .collect()
}

#[async_trait]
impl TickerUniverse for CsvUniverse {
    fn name(&self) -> &str {
        &self.name
    }

    async fn symbols(&self) -> Result<Vec<String>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ScreenerError::Provider(format!("reading {}: {}", self.path.display(), e))
        })?;
        let symbols = parse_first_column(&content);
        debug!("Loaded {} symbols from {}", symbols.len(), self.path.display());
        Ok(symbols)
    }
}
