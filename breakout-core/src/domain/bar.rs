//! Daily bar: one trading day of price data for a symbol.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol on a single trading day.
///
/// Only `close` feeds breakout detection. The other columns are kept so the
/// cache holds everything the provider returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl DailyBar {
    /// Bar carrying only a close; OHL are set to the close and volume to zero.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Build close-only bars on consecutive calendar days starting at `start`.
///
/// Used for synthetic series in tests, benches, and offline fixtures.
pub fn daily_bars(start: NaiveDate, closes: &[f64]) -> Vec<DailyBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| DailyBar::from_close(start + Duration::days(i as i64), close))
        .collect()
}
