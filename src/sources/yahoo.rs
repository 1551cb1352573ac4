//! Yahoo Finance API client for bar history and quotes.
//!
//! Uses the unofficial chart endpoint for history. Quotes come from the v7 quote
//! endpoint when it answers, otherwise from chart metadata, which lacks market
//! cap and PE.

use super::{PriceHistoryProvider, QuoteProvider};
use crate::error::{Result, ScreenerError};
use crate::types::{Bar, Quote, Series};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    symbol: String,
    regular_market_price: Option<f64>,
    regular_market_volume: Option<f64>,
    chart_previous_close: Option<f64>,
    long_name: Option<String>,
    short_name: Option<String>,
    currency: Option<String>,
    exchange_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Yahoo Finance v7 quote response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteResponse {
    quote_response: YahooQuoteResult,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResult {
    result: Vec<YahooQuoteItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteItem {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_volume: Option<f64>,
    regular_market_change_percent: Option<f64>,
    market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    currency: Option<String>,
    full_exchange_name: Option<String>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.to_uppercase().replace('.', "-")
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_chart(&self, symbol: &str, range: &str, interval: &str) -> Result<YahooResult> {
        let yahoo_symbol = normalize_yahoo_symbol(symbol);
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
            yahoo_symbol, range, interval
        );

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ScreenerError::NoData(symbol.to_string()));
        }
        if !response.status().is_success() {
            return Err(ScreenerError::Provider(format!(
                "Yahoo chart error for {}: {}",
                symbol,
                response.status()
            )));
        }

        let data: YahooChartResponse = response.json().await?;
        extract_result(symbol, data)
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let url = format!(
            "https://query1.finance.yahoo.com/v7/finance/quote?symbols={}",
            normalize_yahoo_symbol(symbol)
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            debug!("Yahoo quote endpoint returned {} for {}", response.status(), symbol);
            return Ok(None);
        }
        let data: YahooQuoteResponse = response.json().await?;
        Ok(data
            .quote_response
            .result
            .into_iter()
            .next()
            .and_then(|item| quote_from_item(symbol, item)))
    }
}

fn extract_result(symbol: &str, data: YahooChartResponse) -> Result<YahooResult> {
    if let Some(error) = data.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(ScreenerError::NoData(symbol.to_string()));
        }
        return Err(ScreenerError::Provider(format!(
            "Yahoo API error: {} - {}",
            error.code, error.description
        )));
    }

    data.chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ScreenerError::NoData(symbol.to_string()))
}

fn split_result(result: YahooResult) -> (YahooMeta, Vec<Bar>) {
    let bars = bars_from_parts(result.timestamp, result.indicators);
    (result.meta, bars)
}

fn bars_from_parts(timestamps: Option<Vec<i64>>, indicators: YahooIndicators) -> Vec<Bar> {
    let timestamps = timestamps.unwrap_or_default();
    let quote = match indicators.quote.into_iter().next() {
        Some(q) => q,
        None => return Vec::new(),
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let values = (
            opens.get(i).copied().flatten(),
            highs.get(i).copied().flatten(),
            lows.get(i).copied().flatten(),
            closes.get(i).copied().flatten(),
        );
        // Skip incomplete data points
        let (Some(open), Some(high), Some(low), Some(close)) = values else {
            continue;
        };
        if close <= 0.0 {
            continue;
        }
        let volume = volumes.get(i).copied().flatten().unwrap_or(0) as f64;
        bars.push(Bar::new(timestamp, open, high, low, close, volume));
    }

    bars
}

fn quote_from_meta(symbol: &str, meta: &YahooMeta, last: Option<&Bar>) -> Option<Quote> {
    let price = meta.regular_market_price.or(last.map(|b| b.close))?;
    let change_percent = meta
        .chart_previous_close
        .filter(|prev| *prev != 0.0)
        .map(|prev| (price - prev) / prev * 100.0);

    Some(Quote {
        symbol: symbol.to_string(),
        name: meta.long_name.clone().or_else(|| meta.short_name.clone()),
        price,
        volume: meta
            .regular_market_volume
            .or(last.map(|b| b.volume))
            .unwrap_or(0.0),
        market_cap: None,
        pe_ratio: None,
        change_percent,
        currency: meta.currency.clone(),
        exchange: meta.exchange_name.clone(),
    })
}

fn quote_from_item(symbol: &str, item: YahooQuoteItem) -> Option<Quote> {
    let price = item.regular_market_price?;
    let change_percent = match item.regular_market_open {
        Some(open) if open != 0.0 => Some((price - open) / open * 100.0),
        _ => item.regular_market_change_percent,
    };
    debug!("Quote for {} resolved as {}", symbol, item.symbol);

    Some(Quote {
        symbol: symbol.to_string(),
        name: item.long_name.or(item.short_name),
        price,
        volume: item.regular_market_volume.unwrap_or(0.0),
        market_cap: item.market_cap,
        pe_ratio: item.trailing_pe,
        change_percent,
        currency: item.currency,
        exchange: item.full_exchange_name,
    })
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    async fn history(&self, symbol: &str, range: &str, interval: &str) -> Result<Series> {
        let result = self.fetch_chart(symbol, range, interval).await?;
        let (_, bars) = split_result(result);
        if bars.is_empty() {
            return Err(ScreenerError::NoData(symbol.to_string()));
        }
        Ok(Series::new(symbol, bars))
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceClient {
    async fn quote(&self, symbol: &str) -> Result<Quote> {
        match self.fetch_quote(symbol).await {
            Ok(Some(quote)) => return Ok(quote),
            Ok(None) => {}
            Err(e) => warn!("Yahoo quote failed for {}: {}", symbol, e),
        }

        let result = self.fetch_chart(symbol, "5d", "1d").await?;
        let (meta, bars) = split_result(result);
        debug!("Quote for {} from chart metadata ({})", symbol, meta.symbol);
        quote_from_meta(symbol, &meta, bars.last())
            .ok_or_else(|| ScreenerError::NoData(symbol.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_yahoo_symbol_dots_to_hyphens() {
        assert_eq!(normalize_yahoo_symbol("BRK.B"), "BRK-B");
        assert_eq!(normalize_yahoo_symbol("brk.a"), "BRK-A");
        assert_eq!(normalize_yahoo_symbol("aapl"), "AAPL");
    }

    #[test]
    fn test_chart_error_not_found_is_no_data() {
        let json = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let data: YahooChartResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            extract_result("ZZZZ", data),
            Err(ScreenerError::NoData(_))
        ));
    }

    #[test]
    fn test_bars_skip_null_points() {
        let json = r#"{"chart": {"result": [{
            "meta": {"symbol": "AAPL", "regularMarketPrice": 155.0, "chartPreviousClose": 150.0, "currency": "USD", "exchangeName": "NMS"},
            "timestamp": [1700000000, 1700086400, 1700172800],
            "indicators": {"quote": [{
                "open": [150.0, null, 152.0],
                "high": [155.0, 156.0, 157.0],
                "low": [148.0, 149.0, 150.0],
                "close": [153.0, 154.0, 155.0],
                "volume": [50000000, null, null]
            }]}
        }], "error": null}}"#;
        let data: YahooChartResponse = serde_json::from_str(json).unwrap();
        let result = extract_result("AAPL", data).unwrap();

        let (meta, bars) = split_result(result);
        let quote = quote_from_meta("AAPL", &meta, bars.last()).unwrap();
        assert_eq!(quote.price, 155.0);
        assert_eq!(quote.currency.as_deref(), Some("USD"));
        assert!((quote.change_percent.unwrap() - 10.0 / 3.0).abs() < 1e-9);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].volume, 50000000.0);
        assert_eq!(bars[1].time, 1700172800);
        assert_eq!(bars[1].volume, 0.0);
    }

    #[test]
    fn test_quote_item_change_from_open() {
        let json = r#"{"quoteResponse": {"result": [{
            "symbol": "KO", "longName": "The Coca-Cola Company",
            "regularMarketPrice": 63.0, "regularMarketOpen": 60.0,
            "regularMarketVolume": 12000000, "marketCap": 270000000000,
            "trailingPE": 24.5, "currency": "USD", "fullExchangeName": "NYSE"
        }]}}"#;
        let data: YahooQuoteResponse = serde_json::from_str(json).unwrap();
        let item = data.quote_response.result.into_iter().next().unwrap();
        let quote = quote_from_item("KO", item).unwrap();
        assert!((quote.change_percent.unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(quote.pe_ratio, Some(24.5));
        assert_eq!(quote.market_cap, Some(270000000000.0));
        assert_eq!(quote.exchange.as_deref(), Some("NYSE"));
    }
}
