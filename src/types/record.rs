use super::{CurrentSignal, EnrichedBar, Series};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Latest quote snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: Option<String>,
    pub price: f64,
    pub volume: f64,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    /// Session change versus the open, in percent.
    pub change_percent: Option<f64>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

impl Quote {
    /// Minimal quote carrying only a price and volume.
    pub fn from_price(symbol: impl Into<String>, price: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            price,
            volume,
            market_cap: None,
            pe_ratio: None,
            change_percent: None,
            currency: None,
            exchange: None,
        }
    }

    /// Quote derived from the last bar of a series, for callers without a quote feed.
    pub fn from_series(series: &Series) -> Option<Self> {
        let last = series.last()?;
        let mut quote = Self::from_price(series.symbol.clone(), last.close, last.volume);
        if last.open != 0.0 {
            quote.change_percent = Some((last.close - last.open) / last.open * 100.0);
        }
        Some(quote)
    }
}

/// Price position relative to the 50-bar moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Bullish,
    Bearish,
    Neutral,
}

/// How a record's trade levels were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSource {
    /// Range- and volatility-driven estimate from bar history.
    History,
    /// Degraded randomized placement used when no history is available.
    RandomizedFallback,
}

/// Entry, exit and stop-loss price levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLevels {
    pub entry_point: f64,
    pub exit_point: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
}

/// Per-ticker summary produced by one enrichment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerRecord {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub price: f64,
    pub volume: f64,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub change_percent: f64,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub rsi: Option<f64>,
    pub upper_bb: Option<f64>,
    pub lower_bb: Option<f64>,
    pub volatility: Option<f64>,
    pub levels: TradeLevels,
    pub level_source: LevelSource,
    pub market_trend: MarketTrend,
    pub current_signal: CurrentSignal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candles: Vec<EnrichedBar>,
    pub last_updated: String,
}

/// Named trading bucket a screen ranks records into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketKind {
    DayTrading,
    SwingTrading,
    LongTerm,
}

impl BucketKind {
    pub const ALL: [BucketKind; 3] = [
        BucketKind::DayTrading,
        BucketKind::SwingTrading,
        BucketKind::LongTerm,
    ];

    /// Get the bucket from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "day-trading" | "day" => Some(BucketKind::DayTrading),
            "swing-trading" | "swing" => Some(BucketKind::SwingTrading),
            "long-term" | "long" => Some(BucketKind::LongTerm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKind::DayTrading => "day-trading",
            BucketKind::SwingTrading => "swing-trading",
            BucketKind::LongTerm => "long-term",
        }
    }
}

/// A symbol left out of a batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedTicker {
    pub symbol: String,
    pub reason: String,
    pub detail: String,
}

/// Outcome of enriching many series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub records: Vec<TickerRecord>,
    pub skipped: Vec<SkippedTicker>,
}

/// Outcome of a full screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResult {
    pub generated_at: String,
    pub buckets: BTreeMap<BucketKind, Vec<TickerRecord>>,
    pub skipped: Vec<SkippedTicker>,
}
