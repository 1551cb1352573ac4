//! Entry/exit/stop-loss estimation with per-symbol stabilization.

use crate::services::indicators::{format_price, round_to};
use crate::types::{Bar, CandleAnalysis, TradeLevels};
use dashmap::DashMap;
use rand::Rng;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Relative price move below which cached levels are reused.
pub const DEFAULT_NOISE_THRESHOLD: f64 = 0.01;

/// Levels remembered for a symbol, stored at 6-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedLevels {
    pub entry_point: f64,
    pub exit_point: f64,
    pub stop_loss: Option<f64>,
    pub last_price: f64,
}

impl CachedLevels {
    fn levels(&self) -> TradeLevels {
        TradeLevels {
            entry_point: format_price(self.entry_point),
            exit_point: format_price(self.exit_point),
            stop_loss: self.stop_loss.map(format_price),
        }
    }
}

type Slot = Arc<Mutex<Option<CachedLevels>>>;

/// Last computed levels per symbol.
///
/// Each symbol has its own lock, so a read-decide-write for one symbol is
/// atomic while other symbols proceed independently.
#[derive(Default)]
pub struct LevelCache {
    entries: DashMap<String, Slot>,
}

impl LevelCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self, symbol: &str) -> Option<CachedLevels> {
        let slot = self.entries.get(&normalize(symbol))?.value().clone();
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run `f` with exclusive access to the symbol's cached levels.
    fn with_slot<R>(&self, symbol: &str, f: impl FnOnce(&mut Option<CachedLevels>) -> R) -> R {
        let slot = self.entries.entry(normalize(symbol)).or_default().value().clone();
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Inputs to the range/volatility level formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelInputs {
    pub current_price: f64,
    /// Highest high minus lowest low over the recent window.
    pub price_range: f64,
    /// Mean per-bar volatility (percent) over the recent window.
    pub volatility: f64,
}

impl LevelInputs {
    /// Build inputs from the last `window` bars and their full-precision analyses.
    pub fn from_recent(
        bars: &[Bar],
        analyses: &[CandleAnalysis],
        current_price: f64,
        window: usize,
    ) -> Option<Self> {
        let start = bars.len().saturating_sub(window);
        let recent = &bars[start..];
        if recent.is_empty() || analyses.len() != bars.len() {
            return None;
        }

        let high = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let volatility = analyses[start..].iter().map(|a| a.volatility).sum::<f64>()
            / recent.len() as f64;

        Some(Self {
            current_price,
            price_range: high - low,
            volatility,
        })
    }
}

/// Result of one estimation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub levels: TradeLevels,
    pub cache_hit: bool,
}

/// Computes trade levels and stabilizes them through a [`LevelCache`].
pub struct LevelEstimator {
    cache: Arc<LevelCache>,
    noise_threshold: f64,
}

impl LevelEstimator {
    pub fn new(cache: Arc<LevelCache>) -> Self {
        Self {
            cache,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
        }
    }

    pub fn with_noise_threshold(mut self, noise_threshold: f64) -> Self {
        self.noise_threshold = noise_threshold;
        self
    }

    pub fn cache(&self) -> &Arc<LevelCache> {
        &self.cache
    }

    /// Range- and volatility-driven levels.
    pub fn estimate(&self, symbol: &str, inputs: LevelInputs) -> Estimate {
        self.stabilized(symbol, inputs.current_price, || {
            let volatility_factor = inputs.volatility / 100.0;
            let entry = inputs.current_price - inputs.price_range * volatility_factor.min(0.1);
            let exit = inputs.current_price + inputs.price_range * (2.0 * volatility_factor).max(0.2);
            let stop = entry - inputs.price_range * (volatility_factor / 2.0).min(0.05);
            (entry, exit, Some(stop))
        })
    }

    /// Degraded placement for symbols without usable bar history.
    ///
    /// Entry lands 1-3% above or below the price with equal odds, exit 5-10%
    /// above. No stop-loss is produced. Pass a seeded RNG for reproducible output.
    pub fn estimate_fallback<R: Rng>(
        &self,
        symbol: &str,
        current_price: f64,
        rng: &mut R,
    ) -> Estimate {
        self.stabilized(symbol, current_price, || {
            let offset = rng.gen::<f64>() * 0.02 + 0.01;
            let entry = if rng.gen::<f64>() < 0.5 {
                current_price * (1.0 + offset)
            } else {
                current_price * (1.0 - offset)
            };
            let exit = current_price * (1.0 + (rng.gen::<f64>() * 0.05 + 0.05));
            (entry, exit, None)
        })
    }

    fn stabilized<F>(&self, symbol: &str, current_price: f64, compute: F) -> Estimate
    where
        F: FnOnce() -> (f64, f64, Option<f64>),
    {
        let threshold = self.noise_threshold;
        self.cache.with_slot(symbol, |slot| {
            if let Some(cached) = slot.as_ref() {
                if cached.last_price > 0.0
                    && ((current_price - cached.last_price) / cached.last_price).abs() < threshold
                {
                    debug!(
                        "Reusing levels for {} (price {} vs cached {})",
                        symbol, current_price, cached.last_price
                    );
                    return Estimate {
                        levels: cached.levels(),
                        cache_hit: true,
                    };
                }
            }

            let (entry, exit, stop) = compute();
            let fresh = CachedLevels {
                entry_point: round_to(entry, 6),
                exit_point: round_to(exit, 6),
                stop_loss: stop.map(|s| round_to(s, 6)),
                last_price: current_price,
            };
            debug!(
                "Recomputed levels for {}: entry {} exit {}",
                symbol, fresh.entry_point, fresh.exit_point
            );
            *slot = Some(fresh);

            Estimate {
                levels: fresh.levels(),
                cache_hit: false,
            }
        })
    }
}
