//! Technical indicator implementations.
//!
//! Every rolling series returned here has the same length as its input, with
//! `None` marking positions that do not yet have a full window behind them.

pub mod bollinger;
pub mod rsi;
pub mod sma;

pub use bollinger::BandComputer;
pub use rsi::{rolling_rsi, rsi};
pub use sma::{rolling_mean, rolling_std};

/// Indicator values aligned by index with the source series.
pub type Series = Vec<Option<f64>>;

/// Parallel indicator series computed from one close sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub ma20: Series,
    pub std20: Series,
    pub upper_bb: Series,
    pub lower_bb: Series,
    pub ma50: Series,
    pub ma200: Series,
    pub rsi: Series,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.ma20.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ma20.is_empty()
    }
}

/// Last element of an indicator series, if defined.
pub fn tail(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Apply `f` over every full trailing window of `values`.
pub(crate) fn rolling<F>(values: &[f64], window: usize, f: F) -> Series
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 >= window {
                Some(f(&values[i + 1 - window..=i]))
            } else {
                None
            }
        })
        .collect()
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round a price for display: sub-cent prices keep 6 decimals, others 2.
pub fn format_price(price: f64) -> f64 {
    if price > 0.0 && price < 0.01 {
        round_to(price, 6)
    } else {
        round_to(price, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(1.235001, 2), 1.24);
        assert_eq!(round_to(-2.5551, 2), -2.56);
        assert_eq!(round_to(0.1234567, 6), 0.123457);
    }

    #[test]
    fn test_format_price_keeps_sub_cent_precision() {
        assert_eq!(format_price(0.0012346), 0.001235);
        assert_eq!(format_price(12.3456), 12.35);
        assert_eq!(format_price(0.0), 0.0);
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail(&[None, Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(tail(&[Some(1.0), None]), None);
        assert_eq!(tail(&[]), None);
    }

    #[test]
    fn test_rolling_zero_window() {
        assert_eq!(rolling(&[1.0, 2.0], 0, |w| w[0]), vec![None, None]);
    }
}
