//! Per-bar candle metrics and pattern flags.

use crate::services::indicators::round_to;
use crate::types::{Bar, CandleAnalysis, CandleColor, CandlePatterns, VolumeStats};

/// Number of preceding bars averaged for the volume comparison.
const VOLUME_LOOKBACK: usize = 5;

/// Derives body, shadow, pattern, volume and range metrics for each bar.
///
/// Values are computed at full precision. Call [`CandleAnalyzer::round`] for
/// the 2-decimal output form.
#[derive(Debug, Clone)]
pub struct CandleAnalyzer {
    volume_lookback: usize,
}

impl Default for CandleAnalyzer {
    fn default() -> Self {
        Self {
            volume_lookback: VOLUME_LOOKBACK,
        }
    }
}

impl CandleAnalyzer {
    pub fn analyze_all(&self, bars: &[Bar]) -> Vec<CandleAnalysis> {
        (0..bars.len()).map(|i| self.analyze(bars, i)).collect()
    }

    /// Analyze `bars[index]` using the bars before it for volume context.
    pub fn analyze(&self, bars: &[Bar], index: usize) -> CandleAnalysis {
        let bar = &bars[index];

        let price_change = bar.close - bar.open;
        let price_change_percent = if bar.open != 0.0 {
            price_change / bar.open * 100.0
        } else {
            0.0
        };

        let body_length = price_change.abs();
        let upper_shadow = bar.high - bar.open.max(bar.close);
        let lower_shadow = bar.open.min(bar.close) - bar.low;

        let patterns = CandlePatterns {
            is_hammer: lower_shadow > 2.0 * body_length && upper_shadow <= 0.1 * body_length,
            is_inverted_hammer: upper_shadow > 2.0 * body_length
                && lower_shadow <= 0.1 * body_length,
            is_doji: body_length <= 0.1 * (bar.high - bar.low),
        };

        let volatility = if bar.low != 0.0 {
            (bar.high - bar.low) / bar.low * 100.0
        } else {
            0.0
        };

        CandleAnalysis {
            price_change,
            price_change_percent,
            body_length,
            upper_shadow,
            lower_shadow,
            patterns,
            volume: self.volume_stats(bars, index),
            volatility,
        }
    }

    fn volume_stats(&self, bars: &[Bar], index: usize) -> VolumeStats {
        let volume = bars[index].volume;
        if index == 0 {
            return VolumeStats {
                change: 0.0,
                average_volume: 0.0,
                above_average: volume > 0.0,
            };
        }

        let previous = bars[index - 1].volume;
        let change = if previous != 0.0 {
            (volume - previous) / previous * 100.0
        } else {
            0.0
        };

        let start = index.saturating_sub(self.volume_lookback);
        let window = &bars[start..index];
        let average_volume = window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64;

        VolumeStats {
            change,
            average_volume,
            above_average: volume > average_volume,
        }
    }

    /// Output form: 2 decimals for prices and percentages, whole units for average volume.
    pub fn round(analysis: &CandleAnalysis) -> CandleAnalysis {
        CandleAnalysis {
            price_change: round_to(analysis.price_change, 2),
            price_change_percent: round_to(analysis.price_change_percent, 2),
            body_length: round_to(analysis.body_length, 2),
            upper_shadow: round_to(analysis.upper_shadow, 2),
            lower_shadow: round_to(analysis.lower_shadow, 2),
            patterns: analysis.patterns,
            volume: VolumeStats {
                change: round_to(analysis.volume.change, 2),
                average_volume: analysis.volume.average_volume.round(),
                above_average: analysis.volume.above_average,
            },
            volatility: round_to(analysis.volatility, 2),
        }
    }

    pub fn color(bar: &Bar) -> CandleColor {
        if bar.close > bar.open {
            CandleColor::Bullish
        } else {
            CandleColor::Bearish
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
        Bar::new(0, open, high, low, close, volume)
    }

    #[test]
    fn test_body_and_shadows() {
        let bars = [bar(10.0, 13.0, 8.0, 12.0, 100.0)];
        let a = CandleAnalyzer::default().analyze(&bars, 0);
        assert_eq!(a.price_change, 2.0);
        assert!((a.price_change_percent - 20.0).abs() < 1e-12);
        assert_eq!(a.body_length, 2.0);
        assert_eq!(a.upper_shadow, 1.0);
        assert_eq!(a.lower_shadow, 2.0);
        assert!((a.volatility - 62.5).abs() < 1e-12);
    }

    #[test]
    fn test_hammer() {
        // body 1, lower shadow 5, no upper shadow
        let bars = [bar(10.0, 11.0, 5.0, 11.0, 100.0)];
        let p = CandleAnalyzer::default().analyze(&bars, 0).patterns;
        assert!(p.is_hammer);
        assert!(!p.is_inverted_hammer);
        assert!(!p.is_doji);
    }

    #[test]
    fn test_inverted_hammer() {
        let bars = [bar(10.0, 16.0, 10.0, 11.0, 100.0)];
        let p = CandleAnalyzer::default().analyze(&bars, 0).patterns;
        assert!(p.is_inverted_hammer);
        assert!(!p.is_hammer);
    }

    #[test]
    fn test_doji_can_coexist_with_hammer() {
        // body 0.05, range 5.05 -> doji; lower shadow 5 > 0.1, upper 0 -> hammer
        let bars = [bar(10.0, 10.05, 5.0, 10.05, 100.0)];
        let p = CandleAnalyzer::default().analyze(&bars, 0).patterns;
        assert!(p.is_doji);
        assert!(p.is_hammer);
    }

    #[test]
    fn test_volume_stats_first_bar() {
        let bars = [bar(10.0, 11.0, 9.0, 10.5, 500.0)];
        let v = CandleAnalyzer::default().analyze(&bars, 0).volume;
        assert_eq!(v.change, 0.0);
        assert_eq!(v.average_volume, 0.0);
        assert!(v.above_average);
    }

    #[test]
    fn test_volume_stats_uses_up_to_five_preceding_bars() {
        let volumes = [100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 1200.0];
        let bars: Vec<Bar> = volumes
            .iter()
            .map(|v| bar(10.0, 11.0, 9.0, 10.5, *v))
            .collect();
        let analyzer = CandleAnalyzer::default();

        let early = analyzer.analyze(&bars, 2).volume;
        assert_eq!(early.average_volume, 150.0);
        assert!((early.change - 50.0).abs() < 1e-12);

        let late = analyzer.analyze(&bars, 6).volume;
        assert_eq!(late.average_volume, 400.0);
        assert!(late.above_average);
        assert!((late.change - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_previous_volume_sentinel() {
        let bars = [
            bar(10.0, 11.0, 9.0, 10.5, 0.0),
            bar(10.0, 11.0, 9.0, 10.5, 300.0),
        ];
        let v = CandleAnalyzer::default().analyze(&bars, 1).volume;
        assert_eq!(v.change, 0.0);
        assert!(v.above_average);
    }

    #[test]
    fn test_zero_low_and_open_sentinels() {
        let bars = [bar(0.0, 1.0, 0.0, 0.5, 10.0)];
        let a = CandleAnalyzer::default().analyze(&bars, 0);
        assert_eq!(a.volatility, 0.0);
        assert_eq!(a.price_change_percent, 0.0);
    }

    #[test]
    fn test_round_output() {
        let bars = [bar(3.0, 3.3333, 2.9, 3.1111, 10.0), bar(3.0, 3.3, 2.9, 3.1, 13.0)];
        let analyzer = CandleAnalyzer::default();
        let rounded = CandleAnalyzer::round(&analyzer.analyze(&bars, 0));
        assert_eq!(rounded.price_change, 0.11);
        assert_eq!(rounded.upper_shadow, 0.22);
        let second = CandleAnalyzer::round(&analyzer.analyze(&bars, 1));
        assert_eq!(second.volume.change, 30.0);
        assert_eq!(second.volume.average_volume, 10.0);
    }
}
