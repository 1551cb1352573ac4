//! Upstream collaborators: ticker universes, price history and quotes.

pub mod universe;
pub mod yahoo;

pub use universe::{CsvUniverse, StaticUniverse};
pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::types::{Quote, Series};
use async_trait::async_trait;

/// Supplies the ordered set of symbols to screen.
#[async_trait]
pub trait TickerUniverse: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    async fn symbols(&self) -> Result<Vec<String>>;
}

/// Supplies raw bar history for a symbol.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch bars covering `range` (e.g. "1y", "6mo") at `interval` (e.g. "1d", "15m").
    ///
    /// Fails with `NoData` when the provider has nothing for the symbol.
    async fn history(&self, symbol: &str, range: &str, interval: &str) -> Result<Series>;
}

/// Supplies the latest quote for a symbol.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Quote>;
}
