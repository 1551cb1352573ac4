//! Per-ticker enrichment: bands, candle metrics, signals and trade levels.

use crate::error::{Result, ScreenerError};
use crate::services::candles::CandleAnalyzer;
use crate::services::indicators::{format_price, round_to, tail, BandComputer, IndicatorSeries};
use crate::services::levels::{LevelCache, LevelEstimator, LevelInputs};
use crate::services::signals::SignalDetector;
use crate::types::{
    BatchResult, CandleAnalysis, CurrentSignal, EnrichedBar, LevelSource, MarketTrend, Quote, Series,
    SkippedTicker, Technicals, TickerRecord,
};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

/// Numeric knobs for one enrichment service.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Minimum bars required, set by the longest moving average.
    pub min_bars: usize,
    /// Half-width of the extremum window.
    pub signal_window: usize,
    pub rsi_period: usize,
    /// Bars used for the price range and mean volatility behind trade levels.
    pub level_window: usize,
    /// Relative move below which cached levels are reused.
    pub noise_threshold: f64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            min_bars: 200,
            signal_window: 5,
            rsi_period: 14,
            level_window: 20,
            noise_threshold: 0.01,
        }
    }
}

/// Enriched bars plus the intermediate series they were built from.
#[derive(Debug, Clone)]
pub struct EnrichedSeries {
    pub bars: Vec<EnrichedBar>,
    pub indicators: IndicatorSeries,
    /// Full-precision candle metrics, aligned with `bars`.
    pub analyses: Vec<CandleAnalysis>,
}

/// Orchestrates indicator, candle, signal and level computation for tickers.
pub struct TickerEnrichmentService {
    config: EnrichmentConfig,
    bands: BandComputer,
    candles: CandleAnalyzer,
    signals: SignalDetector,
    levels: LevelEstimator,
}

impl TickerEnrichmentService {
    pub fn new(config: EnrichmentConfig, cache: Arc<LevelCache>) -> Self {
        Self {
            bands: BandComputer::default().with_rsi_period(config.rsi_period),
            candles: CandleAnalyzer::default(),
            signals: SignalDetector::new(config.signal_window),
            levels: LevelEstimator::new(cache).with_noise_threshold(config.noise_threshold),
            config,
        }
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    pub fn level_cache(&self) -> &Arc<LevelCache> {
        self.levels.cache()
    }

    /// Build the enriched per-bar sequence. No minimum length is enforced here.
    pub fn enrich_series(&self, series: &Series) -> EnrichedSeries {
        let closes = series.closes();
        let indicators = self.bands.compute(&closes);
        let analyses = self.candles.analyze_all(&series.bars);

        let mut bars: Vec<EnrichedBar> = series
            .bars
            .iter()
            .zip(&analyses)
            .enumerate()
            .map(|(i, (bar, analysis))| EnrichedBar {
                bar: *bar,
                candle_color: CandleAnalyzer::color(bar),
                analysis: CandleAnalyzer::round(analysis),
                technicals: Technicals {
                    ma20: indicators.ma20[i].map(|v| round_to(v, 2)),
                    ma50: indicators.ma50[i].map(|v| round_to(v, 2)),
                    ma200: indicators.ma200[i].map(|v| round_to(v, 2)),
                    signal: None,
                },
            })
            .collect();

        let labels = self.signals.find_signals(&bars);
        for (bar, label) in bars.iter_mut().zip(labels) {
            bar.technicals.signal = label;
        }

        EnrichedSeries {
            bars,
            indicators,
            analyses,
        }
    }

    /// Enrich one series into a ticker record priced from `quote`.
    pub fn enrich(&self, series: &Series, quote: &Quote) -> Result<TickerRecord> {
        if series.len() < self.config.min_bars {
            return Err(ScreenerError::InsufficientData {
                symbol: series.symbol.clone(),
                required: self.config.min_bars,
                actual: series.len(),
            });
        }

        debug!("Enriching {} with {} bars", series.symbol, series.len());

        let enriched = self.enrich_series(series);
        let current_price = quote.price;

        let inputs = LevelInputs::from_recent(
            &series.bars,
            &enriched.analyses,
            current_price,
            self.config.level_window,
        )
        .ok_or_else(|| ScreenerError::InsufficientData {
            symbol: series.symbol.clone(),
            required: self.config.level_window,
            actual: series.len(),
        })?;
        let estimate = self.levels.estimate(&series.symbol, inputs);

        let labels: Vec<_> = enriched.bars.iter().map(|b| b.technicals.signal).collect();
        let current_signal = SignalDetector::current_signal(&labels);

        let ma50 = tail(&enriched.indicators.ma50);
        let market_trend = trend(current_price, ma50);

        let last = series
            .last()
            .copied()
            .ok_or_else(|| ScreenerError::NoData(series.symbol.clone()))?;
        let change_percent = if last.open != 0.0 {
            (last.close - last.open) / last.open * 100.0
        } else {
            0.0
        };

        Ok(TickerRecord {
            symbol: series.symbol.clone(),
            name: quote.name.clone(),
            currency: quote.currency.clone(),
            exchange: quote.exchange.clone(),
            price: format_price(current_price),
            volume: last.volume,
            market_cap: quote.market_cap,
            pe_ratio: quote.pe_ratio,
            change_percent: round_to(change_percent, 2),
            ma20: rounded_tail(&enriched.indicators.ma20),
            ma50: ma50.map(|v| round_to(v, 2)),
            ma200: rounded_tail(&enriched.indicators.ma200),
            rsi: rounded_tail(&enriched.indicators.rsi),
            upper_bb: rounded_tail(&enriched.indicators.upper_bb),
            lower_bb: rounded_tail(&enriched.indicators.lower_bb),
            volatility: Some(round_to(inputs.volatility, 2)),
            levels: estimate.levels,
            level_source: LevelSource::History,
            market_trend,
            current_signal,
            candles: enriched.bars,
            last_updated: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Degraded record for a symbol with a quote but no usable history.
    ///
    /// Carries no indicator readings and randomized levels labeled
    /// [`LevelSource::RandomizedFallback`].
    pub fn fallback_record<R: Rng>(&self, quote: &Quote, rng: &mut R) -> TickerRecord {
        let estimate = self.levels.estimate_fallback(&quote.symbol, quote.price, rng);

        TickerRecord {
            symbol: quote.symbol.clone(),
            name: quote.name.clone(),
            currency: quote.currency.clone(),
            exchange: quote.exchange.clone(),
            price: format_price(quote.price),
            volume: quote.volume,
            market_cap: quote.market_cap,
            pe_ratio: quote.pe_ratio,
            change_percent: round_to(quote.change_percent.unwrap_or(0.0), 2),
            ma20: None,
            ma50: None,
            ma200: None,
            rsi: None,
            upper_bb: None,
            lower_bb: None,
            volatility: None,
            levels: estimate.levels,
            level_source: LevelSource::RandomizedFallback,
            market_trend: MarketTrend::Neutral,
            current_signal: CurrentSignal::Hold,
            candles: Vec::new(),
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Enrich many series, isolating per-ticker failures.
    ///
    /// Series with malformed bars are skipped before any computation.
    pub fn enrich_batch<I>(&self, inputs: I) -> BatchResult
    where
        I: IntoIterator<Item = (Series, Quote)>,
    {
        let mut result = BatchResult::default();

        for (series, quote) in inputs {
            let outcome = series
                .validate()
                .and_then(|_| self.enrich(&series, &quote));

            match outcome {
                Ok(record) => result.records.push(record),
                Err(e) => {
                    warn!("Skipping {}: {}", series.symbol, e);
                    result.skipped.push(SkippedTicker {
                        symbol: series.symbol.clone(),
                        reason: e.kind().to_string(),
                        detail: e.to_string(),
                    });
                }
            }
        }

        result
    }
}

fn trend(current_price: f64, ma50: Option<f64>) -> MarketTrend {
    match ma50 {
        Some(ma) if current_price > ma => MarketTrend::Bullish,
        Some(ma) if current_price < ma => MarketTrend::Bearish,
        _ => MarketTrend::Neutral,
    }
}

fn rounded_tail(series: &[Option<f64>]) -> Option<f64> {
    tail(series).map(|v| round_to(v, 2))
}
