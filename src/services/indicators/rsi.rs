//! Relative Strength Index (RSI) indicator.

use super::{rolling, Series};

/// Default RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI from the first `period` price deltas of `values`.
///
/// Uses simple averages of gains and losses. When fewer than `period` deltas
/// exist the available ones are averaged. Returns `None` with fewer than two
/// values. Zero average loss saturates at 100 rather than dividing by zero.
pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if values.len() < 2 || period == 0 {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    let mut count = 0usize;

    for pair in values.windows(2).take(period) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
        count += 1;
    }

    let avg_gain = gains / count as f64;
    let avg_loss = losses / count as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// RSI at every index, each computed over the trailing `period + 1` values.
///
/// The first `period` positions are undefined.
pub fn rolling_rsi(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }
    rolling(values, period + 1, |window| {
        rsi(window, period).unwrap_or(100.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uptrend(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64 * 1.5).collect()
    }

    fn downtrend(count: usize) -> Vec<f64> {
        (0..count).map(|i| 200.0 - i as f64 * 1.5).collect()
    }

    #[test]
    fn test_rsi_monotonic_increase_saturates() {
        assert_eq!(rsi(&uptrend(30), DEFAULT_RSI_PERIOD), Some(100.0));
    }

    #[test]
    fn test_rsi_monotonic_decrease_is_zero() {
        let value = rsi(&downtrend(30), DEFAULT_RSI_PERIOD).unwrap();
        assert!(value.abs() < 1e-12, "expected 0, got {}", value);
    }

    #[test]
    fn test_rsi_balanced_moves() {
        // Deltas: +1, -1, +1, -1
        let values = [10.0, 11.0, 10.0, 11.0, 10.0];
        let value = rsi(&values, 4).unwrap();
        assert!((value - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_uses_only_first_period_deltas() {
        // First two deltas are gains; later losses are ignored with period 2
        let values = [10.0, 11.0, 12.0, 5.0, 1.0];
        assert_eq!(rsi(&values, 2), Some(100.0));
    }

    #[test]
    fn test_rsi_known_value() {
        // Deltas: +2, -1 => avg gain 1, avg loss 0.5, rs 2 => 66.67
        let values = [10.0, 12.0, 11.0];
        let value = rsi(&values, 2).unwrap();
        assert!((value - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        assert_eq!(rsi(&[10.0], DEFAULT_RSI_PERIOD), None);
        assert_eq!(rsi(&[], DEFAULT_RSI_PERIOD), None);
    }

    #[test]
    fn test_rolling_rsi_prefix_and_range() {
        let values: Vec<f64> = (0..40)
            .map(|i| 100.0 + ((i as f64) * 0.7).sin() * 5.0)
            .collect();
        let series = rolling_rsi(&values, DEFAULT_RSI_PERIOD);
        assert_eq!(series.len(), values.len());
        assert!(series[..DEFAULT_RSI_PERIOD].iter().all(Option::is_none));
        for value in series[DEFAULT_RSI_PERIOD..].iter() {
            let v = value.unwrap();
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
