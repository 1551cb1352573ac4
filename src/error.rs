use thiserror::Error;

/// Screener error types.
#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("Insufficient data for {symbol}: need {required} bars, got {actual}")]
    InsufficientData {
        symbol: String,
        required: usize,
        actual: usize,
    },

    #[error("No data returned for {0}")]
    NoData(String),

    #[error("Malformed bar {index} in {symbol}: {reason}")]
    MalformedBar {
        symbol: String,
        index: usize,
        reason: String,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenerError {
    /// Whether retrying with a different lookback could succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScreenerError::InsufficientData { .. } | ScreenerError::NoData(_)
        )
    }

    /// Short machine-readable reason, used when reporting skipped symbols.
    pub fn kind(&self) -> &'static str {
        match self {
            ScreenerError::InsufficientData { .. } => "insufficient_data",
            ScreenerError::NoData(_) => "no_data",
            ScreenerError::MalformedBar { .. } => "malformed_bar",
            ScreenerError::Provider(_) => "provider",
            ScreenerError::Reqwest(_) => "http",
            ScreenerError::SerdeJson(_) => "decode",
            ScreenerError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScreenerError>;
