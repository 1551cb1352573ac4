use crate::error::{Result, ScreenerError};
use serde::{Deserialize, Serialize};

/// OHLCV (Open, High, Low, Close, Volume) bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in seconds.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check `high >= max(open, close) >= min(open, close) >= low` and non-negative volume.
    /// Returns a description of the first violated constraint.
    pub fn check(&self) -> Option<String> {
        let values = [self.open, self.high, self.low, self.close, self.volume];
        if values.iter().any(|v| !v.is_finite()) {
            return Some("non-finite value".to_string());
        }
        if self.high < self.open.max(self.close) {
            return Some(format!(
                "high {} below body top {}",
                self.high,
                self.open.max(self.close)
            ));
        }
        if self.low > self.open.min(self.close) {
            return Some(format!(
                "low {} above body bottom {}",
                self.low,
                self.open.min(self.close)
            ));
        }
        if self.volume < 0.0 {
            return Some(format!("negative volume {}", self.volume));
        }
        None
    }
}

/// Ordered bar sequence for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Validate bar ordering and price relationships.
    pub fn validate(&self) -> Result<()> {
        for (index, bar) in self.bars.iter().enumerate() {
            if let Some(reason) = bar.check() {
                return Err(ScreenerError::MalformedBar {
                    symbol: self.symbol.clone(),
                    index,
                    reason,
                });
            }
            if index > 0 && bar.time < self.bars[index - 1].time {
                return Err(ScreenerError::MalformedBar {
                    symbol: self.symbol.clone(),
                    index,
                    reason: "timestamp goes backwards".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_check_valid() {
        let bar = Bar::new(0, 10.0, 12.0, 9.0, 11.0, 1000.0);
        assert!(bar.check().is_none());
    }

    #[test]
    fn test_bar_check_high_below_close() {
        let bar = Bar::new(0, 10.0, 10.5, 9.0, 11.0, 1000.0);
        assert!(bar.check().unwrap().contains("high"));
    }

    #[test]
    fn test_series_validate_reports_index() {
        let series = Series::new(
            "XYZ",
            vec![
                Bar::new(0, 10.0, 12.0, 9.0, 11.0, 1000.0),
                Bar::new(60, 10.0, 12.0, 10.5, 11.0, 1000.0),
            ],
        );
        match series.validate() {
            Err(ScreenerError::MalformedBar { symbol, index, .. }) => {
                assert_eq!(symbol, "XYZ");
                assert_eq!(index, 1);
            }
            other => panic!("expected malformed bar, got {:?}", other),
        }
    }

    #[test]
    fn test_series_validate_rejects_time_reversal() {
        let series = Series::new(
            "XYZ",
            vec![
                Bar::new(60, 10.0, 12.0, 9.0, 11.0, 1000.0),
                Bar::new(0, 10.0, 12.0, 9.0, 11.0, 1000.0),
            ],
        );
        assert!(series.validate().is_err());
    }
}
