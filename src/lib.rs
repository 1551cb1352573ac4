//! Stockscope - ticker enrichment and trading-bucket screening

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::Config;
pub use error::{Result, ScreenerError};
