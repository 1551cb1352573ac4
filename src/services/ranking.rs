//! Bucket filter and sort over enriched records.

use crate::types::{BucketKind, TickerRecord};
use std::cmp::Ordering;

/// Minimum session volume for day-trading candidates.
pub const DAY_TRADING_MIN_VOLUME: f64 = 1_000_000.0;
/// Price band for swing-trading candidates.
pub const SWING_MIN_PRICE: f64 = 10.0;
pub const SWING_MAX_PRICE: f64 = 1000.0;
/// Minimum market capitalization for long-term candidates.
pub const LONG_TERM_MIN_MARKET_CAP: f64 = 1_000_000_000.0;
/// Exclusive upper bound on PE ratio for long-term candidates.
pub const LONG_TERM_MAX_PE: f64 = 20.0;

/// Whether a record qualifies for `bucket`.
pub fn qualifies(record: &TickerRecord, bucket: BucketKind) -> bool {
    match bucket {
        BucketKind::DayTrading => record.volume >= DAY_TRADING_MIN_VOLUME,
        BucketKind::SwingTrading => match (record.ma50, record.ma200) {
            (Some(ma50), Some(ma200)) => {
                ma50 > ma200 && (SWING_MIN_PRICE..=SWING_MAX_PRICE).contains(&record.price)
            }
            _ => false,
        },
        BucketKind::LongTerm => {
            let large = record
                .market_cap
                .map_or(false, |cap| cap > LONG_TERM_MIN_MARKET_CAP);
            let cheap = record
                .pe_ratio
                .map_or(false, |pe| pe > 0.0 && pe < LONG_TERM_MAX_PE);
            large && cheap
        }
    }
}

fn sort_key(record: &TickerRecord, bucket: BucketKind) -> f64 {
    match bucket {
        BucketKind::DayTrading => record.change_percent,
        BucketKind::SwingTrading => record.volume,
        BucketKind::LongTerm => record.market_cap.unwrap_or(0.0),
    }
}

/// Filter `records` into `bucket`, sort descending by the bucket's key and keep the top `limit`.
///
/// The sort is stable, so equal keys keep their input order.
pub fn rank(records: &[TickerRecord], bucket: BucketKind, limit: usize) -> Vec<TickerRecord> {
    let mut selected: Vec<&TickerRecord> =
        records.iter().filter(|r| qualifies(r, bucket)).collect();

    selected.sort_by(|a, b| {
        sort_key(b, bucket)
            .partial_cmp(&sort_key(a, bucket))
            .unwrap_or(Ordering::Equal)
    });

    selected.into_iter().take(limit).cloned().collect()
}
