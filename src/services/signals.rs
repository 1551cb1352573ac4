//! Local-extremum buy/sell markers.

use crate::types::{CurrentSignal, EnrichedBar, SignalLabel};

/// Default half-width of the symmetric window.
pub const DEFAULT_SIGNAL_WINDOW: usize = 5;

/// Scans closes for local maxima (sell) and minima (buy).
///
/// A bar is labeled only when a full `window` of bars exists on both sides.
/// The comparison is non-strict: every bar in `[i - window, i + window]` must be
/// `<=` (sell) or `>=` (buy) the candidate, so a flat run of equal closes yields
/// several adjacent labels. When a window is entirely flat the bar counts as a
/// maximum and is labeled sell.
#[derive(Debug, Clone)]
pub struct SignalDetector {
    window: usize,
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self {
            window: DEFAULT_SIGNAL_WINDOW,
        }
    }
}

impl SignalDetector {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn find_signals(&self, bars: &[EnrichedBar]) -> Vec<Option<SignalLabel>> {
        let closes: Vec<f64> = bars.iter().map(EnrichedBar::close).collect();
        self.find_extrema(&closes)
    }

    pub fn find_extrema(&self, closes: &[f64]) -> Vec<Option<SignalLabel>> {
        let n = closes.len();
        let mut labels = vec![None; n];

        for i in self.window..n.saturating_sub(self.window) {
            let current = closes[i];
            let window = &closes[i - self.window..=i + self.window];

            if window.iter().all(|&p| p <= current) {
                labels[i] = Some(SignalLabel::Sell);
            } else if window.iter().all(|&p| p >= current) {
                labels[i] = Some(SignalLabel::Buy);
            }
        }

        labels
    }

    /// Last label scanning oldest to newest, or hold when there is none.
    pub fn current_signal(labels: &[Option<SignalLabel>]) -> CurrentSignal {
        labels.iter().rev().find_map(|l| *l).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_interior_minimum() {
        let closes = [10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0];
        let labels = SignalDetector::default().find_extrema(&closes);
        let labeled: Vec<(usize, SignalLabel)> = labels
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.map(|l| (i, l)))
            .collect();
        assert_eq!(labeled, vec![(6, SignalLabel::Buy)]);
    }

    #[test]
    fn test_single_interior_maximum() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 9.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let labels = SignalDetector::default().find_extrema(&closes);
        assert_eq!(labels[6], Some(SignalLabel::Sell));
        assert_eq!(labels.iter().filter(|l| l.is_some()).count(), 1);
    }

    #[test]
    fn test_edges_never_labeled() {
        let closes: Vec<f64> = (0..40).map(|i| ((i as f64) * 0.9).sin()).collect();
        let window = 5;
        let labels = SignalDetector::new(window).find_extrema(&closes);
        assert!(labels[..window].iter().all(Option::is_none));
        assert!(labels[closes.len() - window..].iter().all(Option::is_none));
    }

    #[test]
    fn test_short_series_has_no_labels() {
        let closes = [3.0, 1.0, 2.0];
        let labels = SignalDetector::default().find_extrema(&closes);
        assert_eq!(labels, vec![None, None, None]);
    }

    #[test]
    fn test_flat_run_labels_adjacent_bars() {
        let mut closes = vec![5.0; 14];
        closes[0] = 9.0;
        closes[13] = 9.0;
        let labels = SignalDetector::new(2).find_extrema(&closes);
        // Interior bars see only equal neighbours, so every one qualifies as a maximum.
        for label in &labels[3..11] {
            assert_eq!(*label, Some(SignalLabel::Sell));
        }
        // Bars whose window reaches a higher edge value are minima.
        assert_eq!(labels[2], Some(SignalLabel::Buy));
        assert_eq!(labels[11], Some(SignalLabel::Buy));
    }

    #[test]
    fn test_current_signal() {
        let labels = [None, Some(SignalLabel::Buy), None, Some(SignalLabel::Sell), None];
        assert_eq!(SignalDetector::current_signal(&labels), CurrentSignal::Sell);
        assert_eq!(SignalDetector::current_signal(&[None, None]), CurrentSignal::Hold);
    }
}
