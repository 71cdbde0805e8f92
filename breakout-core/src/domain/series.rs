//! Price series: a symbol's closes in ascending date order.
//!
//! Offsets count trading days back from the most recent bar: offset 0 is the
//! last bar, offset 1 the one before it. A window "at offset `o`" of width `w`
//! is the `w` closes whose last element sits at offset `o`.

use super::bar::{daily_bars, DailyBar};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("duplicate bar for {symbol} on {date}")]
    DuplicateDate { symbol: String, date: NaiveDate },
}

/// Closes for one symbol, sorted by date, dates unique.
///
/// Dates and closes are split into parallel vectors at construction so the
/// sorted date list is computed once per analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Sort `bars` by date and split them into a series.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<DailyBar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        bars.sort_by_key(|b| b.date);

        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SeriesError::DuplicateDate {
                symbol,
                date: pair[0].date,
            });
        }

        let (dates, closes) = bars.into_iter().map(|b| (b.date, b.close)).unzip();
        Ok(Self {
            symbol,
            dates,
            closes,
        })
    }

    /// Series of closes on consecutive calendar days starting at `start`.
    pub fn from_daily_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Self {
        let dates = daily_bars(start, closes).into_iter().map(|b| b.date).collect();
        Self {
            symbol: symbol.into(),
            dates,
            closes: closes.to_vec(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Index of the bar `offset` trading days back from the most recent one.
    pub fn index_at(&self, offset: usize) -> Option<usize> {
        self.len().checked_sub(offset.checked_add(1)?)
    }

    pub fn close_at(&self, offset: usize) -> Option<f64> {
        self.index_at(offset).map(|i| self.closes[i])
    }

    pub fn date_at(&self, offset: usize) -> Option<NaiveDate> {
        self.index_at(offset).map(|i| self.dates[i])
    }

    /// The `width` closes ending `offset` days back, or `None` if the window
    /// would start before the first bar.
    pub fn window(&self, offset: usize, width: usize) -> Option<&[f64]> {
        let end = self.len().checked_sub(offset)?;
        let start = end.checked_sub(width)?;
        Some(&self.closes[start..end])
    }
}
