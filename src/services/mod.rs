//! Core services for ticker enrichment and screening

pub mod candles;
pub mod enrichment;
pub mod indicators;
pub mod levels;
pub mod ranking;
pub mod screener;
pub mod signals;

pub use candles::CandleAnalyzer;
pub use enrichment::{EnrichedSeries, EnrichmentConfig, TickerEnrichmentService};
pub use indicators::{BandComputer, IndicatorSeries};
pub use levels::{LevelCache, LevelEstimator, LevelInputs};
pub use ranking::rank;
pub use screener::{ScreenerConfig, ScreenerService};
pub use signals::SignalDetector;
