//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (AlphaVantage, in-memory
//! fixtures) so the screeners can be driven offline in tests.

use crate::domain::{DailyBar, SeriesError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("requested data range for {symbol} not available: {reason}")]
    RangeUnavailable { symbol: String, reason: String },

    #[error("malformed {field} for {symbol} on {date}: {reason}")]
    MalformedData {
        symbol: String,
        date: String,
        field: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Errors that make every further request pointless (bad credentials).
    pub fn is_fatal(&self) -> bool {
        matches!(self, DataError::AuthenticationRequired(_))
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    /// Bars in the requested range, ascending by date.
    pub bars: Vec<DailyBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    AlphaVantage,
    Cache,
    InMemory,
}

/// Daily bar source.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol with `start <= date <= end`.
    ///
    /// An empty range is not an error; unknown symbols are.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Check if the provider is currently usable.
    fn is_available(&self) -> bool {
        true
    }
}

/// Keep the bars of `bars` that fall in `[start, end]`, sorted ascending.
pub fn bars_in_range(bars: &[DailyBar], start: NaiveDate, end: NaiveDate) -> Vec<DailyBar> {
    let mut selected: Vec<DailyBar> = bars
        .iter()
        .filter(|b| b.date >= start && b.date <= end)
        .cloned()
        .collect();
    selected.sort_by_key(|b| b.date);
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::daily_bars;

    #[test]
    fn range_filter_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = daily_bars(start, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let picked = bars_in_range(
            &bars,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
        );
        let closes: Vec<f64> = picked.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn only_auth_errors_are_fatal() {
        assert!(DataError::AuthenticationRequired("no key".into()).is_fatal());
        assert!(!DataError::SymbolNotFound { symbol: "X".into() }.is_fatal());
        assert!(!DataError::RateLimited { retry_after_secs: 60 }.is_fatal());
    }
}
