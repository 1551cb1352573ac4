//! Screening run: fetch each universe, enrich every symbol and rank the buckets.

use crate::error::Result;
use crate::services::enrichment::TickerEnrichmentService;
use crate::services::ranking::rank;
use crate::sources::{PriceHistoryProvider, QuoteProvider, TickerUniverse};
use crate::types::{BucketKind, Quote, ScreenResult, Series, SkippedTicker, TickerRecord};
use futures_util::stream::{self, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Settings for one screening run.
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    pub bucket_limit: usize,
    pub concurrency: usize,
    pub timeout: Duration,
    pub primary_range: String,
    pub fallback_range: String,
    pub interval: String,
    pub min_price: f64,
    pub random_fallback: bool,
    /// Fixed seed for the fallback level generator; entropy when unset.
    pub rng_seed: Option<u64>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            bucket_limit: 5,
            concurrency: 8,
            timeout: Duration::from_secs(120),
            primary_range: "1y".to_string(),
            fallback_range: "6mo".to_string(),
            interval: "1d".to_string(),
            min_price: 0.001,
            random_fallback: true,
            rng_seed: None,
        }
    }
}

/// Runs the day-trading universe and the core universe through enrichment and ranking.
pub struct ScreenerService {
    config: ScreenerConfig,
    enrichment: Arc<TickerEnrichmentService>,
    day_universe: Arc<dyn TickerUniverse>,
    core_universe: Arc<dyn TickerUniverse>,
    history: Arc<dyn PriceHistoryProvider>,
    quotes: Arc<dyn QuoteProvider>,
    rng: Mutex<StdRng>,
}

impl ScreenerService {
    pub fn new(
        config: ScreenerConfig,
        enrichment: Arc<TickerEnrichmentService>,
        day_universe: Arc<dyn TickerUniverse>,
        core_universe: Arc<dyn TickerUniverse>,
        history: Arc<dyn PriceHistoryProvider>,
        quotes: Arc<dyn QuoteProvider>,
    ) -> Self {
        let rng = config
            .rng_seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy);

        Self {
            config,
            enrichment,
            day_universe,
            core_universe,
            history,
            quotes,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Screen both universes and rank the three buckets.
    ///
    /// Symbols present in both universes are fetched once. Every symbol finishes
    /// before any bucket is ranked.
    pub async fn run(&self) -> ScreenResult {
        let start = Instant::now();
        let day_symbols = self.load_universe(self.day_universe.as_ref()).await;
        let core_symbols = self.load_universe(self.core_universe.as_ref()).await;
        let symbols = merge_symbols(&day_symbols, &core_symbols);

        info!(
            "Screening {} symbols ({} {}, {} {})",
            symbols.len(),
            day_symbols.len(),
            self.day_universe.name(),
            core_symbols.len(),
            self.core_universe.name()
        );

        let outcomes = match tokio::time::timeout(self.config.timeout, self.screen_all(&symbols)).await
        {
            Ok(outcomes) => outcomes,
            Err(_) => {
                warn!(
                    "Screening timed out after {:?}, reporting {} symbols as skipped",
                    self.config.timeout,
                    symbols.len()
                );
                return timed_out(&symbols, self.config.timeout);
            }
        };

        let mut records: HashMap<String, TickerRecord> = HashMap::new();
        let mut skipped = Vec::new();

        for (symbol, outcome) in symbols.iter().zip(outcomes) {
            match outcome {
                Ok(record) if record.price < self.config.min_price => {
                    debug!("Dropping {} priced at {}", symbol, record.price);
                    skipped.push(SkippedTicker {
                        symbol: symbol.clone(),
                        reason: "below_min_price".to_string(),
                        detail: format!("price {} below {}", record.price, self.config.min_price),
                    });
                }
                Ok(record) => {
                    records.insert(symbol.clone(), record);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", symbol, e);
                    skipped.push(SkippedTicker {
                        symbol: symbol.clone(),
                        reason: e.kind().to_string(),
                        detail: e.to_string(),
                    });
                }
            }
        }

        let pick = |universe: &[String]| -> Vec<TickerRecord> {
            universe
                .iter()
                .filter_map(|s| records.get(s).cloned())
                .collect()
        };
        let day_records = pick(&day_symbols);
        let core_records = pick(&core_symbols);

        let limit = self.config.bucket_limit;
        let mut buckets = BTreeMap::new();
        buckets.insert(
            BucketKind::DayTrading,
            rank(&day_records, BucketKind::DayTrading, limit),
        );
        buckets.insert(
            BucketKind::SwingTrading,
            rank(&core_records, BucketKind::SwingTrading, limit),
        );
        buckets.insert(
            BucketKind::LongTerm,
            rank(&core_records, BucketKind::LongTerm, limit),
        );

        info!(
            "Screened {} records, skipped {} in {:?}",
            records.len(),
            skipped.len(),
            start.elapsed()
        );

        ScreenResult {
            generated_at: chrono::Utc::now().to_rfc3339(),
            buckets,
            skipped,
        }
    }

    /// Fetch and enrich one symbol.
    ///
    /// A failed quote is replaced by one derived from the history's last bar. When
    /// history is unusable and the random fallback is enabled, the record is built
    /// from the quote alone.
    pub async fn screen_symbol(&self, symbol: &str) -> Result<TickerRecord> {
        let (quote, history) =
            futures_util::future::join(self.quotes.quote(symbol), self.fetch_history(symbol))
                .await;

        let quote = match quote {
            Ok(quote) => quote,
            Err(e) => match history.as_ref().ok().and_then(Quote::from_series) {
                Some(derived) => {
                    debug!("Quote for {} failed ({}), using last bar", symbol, e);
                    derived
                }
                None => return Err(e),
            },
        };

        let enriched = history.and_then(|series| {
            series.validate()?;
            self.enrichment.enrich(&series, &quote)
        });

        match enriched {
            Ok(record) => Ok(record),
            Err(e) if e.is_recoverable() && self.config.random_fallback => {
                warn!("Using randomized levels for {}: {}", symbol, e);
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                Ok(self.enrichment.fallback_record(&quote, &mut *rng))
            }
            Err(e) => Err(e),
        }
    }

    /// History over the primary range, retried once over the fallback range.
    async fn fetch_history(&self, symbol: &str) -> Result<Series> {
        let interval = &self.config.interval;
        match self
            .history
            .history(symbol, &self.config.primary_range, interval)
            .await
        {
            Ok(series) => Ok(series),
            Err(e) if e.is_recoverable() => {
                debug!(
                    "Retrying {} over {} after: {}",
                    symbol, self.config.fallback_range, e
                );
                self.history
                    .history(symbol, &self.config.fallback_range, interval)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn screen_all(&self, symbols: &[String]) -> Vec<Result<TickerRecord>> {
        stream::iter(symbols)
            .map(|symbol| self.screen_symbol(symbol))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    async fn load_universe(&self, universe: &dyn TickerUniverse) -> Vec<String> {
        match universe.symbols().await {
            Ok(symbols) => dedupe(symbols),
            Err(e) => {
                warn!("Universe {} unavailable: {}", universe.name(), e);
                Vec::new()
            }
        }
    }
}

/// Trim, uppercase and drop repeats, keeping first-seen order.
fn dedupe(symbols: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

fn merge_symbols(first: &[String], second: &[String]) -> Vec<String> {
    dedupe(first.iter().chain(second).cloned().collect())
}

fn timed_out(symbols: &[String], timeout: Duration) -> ScreenResult {
    let buckets = BucketKind::ALL
        .into_iter()
        .map(|kind| (kind, Vec::new()))
        .collect();
    let skipped = symbols
        .iter()
        .map(|symbol| SkippedTicker {
            symbol: symbol.clone(),
            reason: "timeout".to_string(),
            detail: format!("no result within {:?}", timeout),
        })
        .collect();

    ScreenResult {
        generated_at: chrono::Utc::now().to_rfc3339(),
        buckets,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedupe_normalizes_and_keeps_order() {
        let symbols = dedupe(strings(&["aapl", " MSFT", "AAPL", "", "ko"]));
        assert_eq!(symbols, strings(&["AAPL", "MSFT", "KO"]));
    }

    #[test]
    fn test_merge_symbols_shares_overlap() {
        let merged = merge_symbols(&strings(&["SNDL", "AAPL"]), &strings(&["AAPL", "KO"]));
        assert_eq!(merged, strings(&["SNDL", "AAPL", "KO"]));
    }

    #[test]
    fn test_timed_out_lists_every_symbol() {
        let result = timed_out(&strings(&["A", "B"]), Duration::from_secs(1));
        assert_eq!(result.skipped.len(), 2);
        assert!(result.skipped.iter().all(|s| s.reason == "timeout"));
        assert_eq!(result.buckets.len(), 3);
        assert!(result.buckets.values().all(|records| records.is_empty()));
    }
}
