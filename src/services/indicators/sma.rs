//! Simple Moving Average (SMA) and rolling standard deviation.

use super::{rolling, Series};

/// Rolling arithmetic mean over `window` values.
///
/// Index `i` holds the mean of `values[i + 1 - window..=i]` once `i + 1 >= window`.
pub fn rolling_mean(values: &[f64], window: usize) -> Series {
    rolling(values, window, mean)
}

/// Rolling sample standard deviation (n - 1 denominator) over `window` values.
///
/// A window of one value has a deviation of 0.
pub fn rolling_std(values: &[f64], window: usize) -> Series {
    rolling(values, window, sample_std)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean_prefix_undefined() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = rolling_mean(&values, 3);
        assert_eq!(result.len(), 5);
        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(2.0));
        assert_eq!(result[3], Some(3.0));
        assert_eq!(result[4], Some(4.0));
    }

    #[test]
    fn test_rolling_mean_shorter_than_window() {
        let values = [1.0, 2.0];
        let result = rolling_mean(&values, 5);
        assert_eq!(result, vec![None, None]);
    }

    #[test]
    fn test_rolling_std_sample_deviation() {
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] is sqrt(32 / 7)
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_std(&values, 8);
        let expected = (32.0f64 / 7.0).sqrt();
        assert!(result[..7].iter().all(Option::is_none));
        assert!((result[7].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_std_constant_series_is_zero() {
        let values = [3.0; 6];
        let result = rolling_std(&values, 4);
        assert_eq!(result[3], Some(0.0));
        assert_eq!(result[5], Some(0.0));
    }

    #[test]
    fn test_rolling_std_single_value_window() {
        let result = rolling_std(&[7.0, 8.0], 1);
        assert_eq!(result, vec![Some(0.0), Some(0.0)]);
    }
}
