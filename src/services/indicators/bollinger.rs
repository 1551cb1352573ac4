//! Moving averages and Bollinger Bands over a close series.

use super::{rolling_mean, rolling_rsi, rolling_std, IndicatorSeries, Series};
use super::rsi::DEFAULT_RSI_PERIOD;

/// Builds the moving-average and band series for a close sequence.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
/// - Trend averages: SMA(50), SMA(200)
/// - Rolling RSI(14)
///
/// Bands are undefined wherever the middle band or the deviation is undefined.
#[derive(Debug, Clone)]
pub struct BandComputer {
    period: usize,
    std_dev_multiplier: f64,
    medium_period: usize,
    long_period: usize,
    rsi_period: usize,
}

impl Default for BandComputer {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
            medium_period: 50,
            long_period: 200,
            rsi_period: DEFAULT_RSI_PERIOD,
        }
    }
}

impl BandComputer {
    pub fn with_rsi_period(mut self, rsi_period: usize) -> Self {
        self.rsi_period = rsi_period;
        self
    }

    /// Longest window any produced series needs.
    pub fn longest_window(&self) -> usize {
        self.period
            .max(self.medium_period)
            .max(self.long_period)
            .max(self.rsi_period + 1)
    }

    pub fn compute(&self, closes: &[f64]) -> IndicatorSeries {
        let ma20 = rolling_mean(closes, self.period);
        let std20 = rolling_std(closes, self.period);
        let upper_bb = self.band(&ma20, &std20, self.std_dev_multiplier);
        let lower_bb = self.band(&ma20, &std20, -self.std_dev_multiplier);

        IndicatorSeries {
            upper_bb,
            lower_bb,
            ma20,
            std20,
            ma50: rolling_mean(closes, self.medium_period),
            ma200: rolling_mean(closes, self.long_period),
            rsi: rolling_rsi(closes, self.rsi_period),
        }
    }

    fn band(&self, middle: &[Option<f64>], std_dev: &[Option<f64>], multiplier: f64) -> Series {
        middle
            .iter()
            .zip(std_dev)
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => Some(m + multiplier * s),
                _ => None,
            })
            .collect()
    }
}
