use super::Bar;
use serde::{Deserialize, Serialize};

/// Local-extremum label attached to a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalLabel {
    Buy,
    Sell,
}

/// Most recent actionable signal for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentSignal {
    Buy,
    Sell,
    Hold,
}

impl From<Option<SignalLabel>> for CurrentSignal {
    fn from(label: Option<SignalLabel>) -> Self {
        match label {
            Some(SignalLabel::Buy) => CurrentSignal::Buy,
            Some(SignalLabel::Sell) => CurrentSignal::Sell,
            None => CurrentSignal::Hold,
        }
    }
}

/// Candle body direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleColor {
    Bullish,
    Bearish,
}

/// Candlestick pattern flags. Not mutually exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlePatterns {
    pub is_hammer: bool,
    pub is_inverted_hammer: bool,
    pub is_doji: bool,
}

/// Volume statistics relative to preceding bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeStats {
    /// Percent change from the previous bar's volume.
    pub change: f64,
    /// Mean volume of up to 5 preceding bars.
    pub average_volume: f64,
    pub above_average: bool,
}

/// Per-bar derived metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleAnalysis {
    pub price_change: f64,
    pub price_change_percent: f64,
    pub body_length: f64,
    pub upper_shadow: f64,
    pub lower_shadow: f64,
    pub patterns: CandlePatterns,
    pub volume: VolumeStats,
    /// Day range as a percentage of the low.
    pub volatility: f64,
}

/// Moving averages and extremum label for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technicals {
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub signal: Option<SignalLabel>,
}

/// A bar with its analysis and technicals blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedBar {
    #[serde(flatten)]
    pub bar: Bar,
    pub candle_color: CandleColor,
    pub analysis: CandleAnalysis,
    pub technicals: Technicals,
}

impl EnrichedBar {
    pub fn close(&self) -> f64 {
        self.bar.close
    }
}
