//! Breakout locator: walks a series from a starting offset until the
//! breakout condition holds.

use super::{detected, BreakoutError, DEFAULT_SMOOTHING_PERIOD};
use crate::domain::{BreakoutMode, PriceSeries};
use crate::indicators::smoothed_tail;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Direction in which the search moves through history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepDirection {
    /// Toward older bars (offset increases).
    #[default]
    Backward,
    /// Toward more recent bars (offset decreases).
    Forward,
}

/// A located breakout: the raw close on the triggering day and where it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakoutEvent {
    pub mode: BreakoutMode,
    pub price: f64,
    pub offset: usize,
    pub date: NaiveDate,
}

/// Parameters of a single locator search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakoutQuery {
    pub mode: BreakoutMode,
    pub start_offset: usize,
    /// Window width before smoothing warm-up is added.
    pub num_days: usize,
    pub direction: StepDirection,
    /// Log the hit at info level instead of debug.
    pub verbose: bool,
}

impl BreakoutQuery {
    pub fn backward(mode: BreakoutMode, start_offset: usize, num_days: usize) -> Self {
        Self {
            mode,
            start_offset,
            num_days,
            direction: StepDirection::Backward,
            verbose: false,
        }
    }

    pub fn forward(mode: BreakoutMode, start_offset: usize, num_days: usize) -> Self {
        Self {
            direction: StepDirection::Forward,
            ..Self::backward(mode, start_offset, num_days)
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Breakout search over one series with a fixed smoothing period.
#[derive(Debug, Clone, Copy)]
pub struct BreakoutLocator<'a> {
    series: &'a PriceSeries,
    smoothing_period: usize,
}

impl<'a> BreakoutLocator<'a> {
    pub fn new(series: &'a PriceSeries) -> Self {
        Self::with_smoothing(series, DEFAULT_SMOOTHING_PERIOD)
    }

    pub fn with_smoothing(series: &'a PriceSeries, smoothing_period: usize) -> Self {
        Self {
            series,
            smoothing_period,
        }
    }

    /// Whether the breakout condition holds for the window at `offset`.
    ///
    /// Fails with `SearchExhausted` when the window would start before the
    /// first bar.
    pub fn breakout_at(
        &self,
        mode: BreakoutMode,
        offset: usize,
        num_days: usize,
    ) -> Result<bool, BreakoutError> {
        if num_days == 0 {
            return Err(BreakoutError::EmptyWindow);
        }
        let window = self
            .series
            .window(offset, num_days + self.smoothing_period)
            .ok_or_else(|| self.exhausted(mode, offset))?;
        Ok(detected(&smoothed_tail(window, self.smoothing_period), mode))
    }

    /// Nearest offset from `query.start_offset` (inclusive) at which the
    /// breakout condition holds, stepping in `query.direction`.
    pub fn locate(&self, query: BreakoutQuery) -> Result<BreakoutEvent, BreakoutError> {
        let mut offset = query.start_offset;
        loop {
            if self.breakout_at(query.mode, offset, query.num_days)? {
                return self.event_at(query, offset);
            }
            offset = match query.direction {
                StepDirection::Backward => offset + 1,
                StepDirection::Forward => offset
                    .checked_sub(1)
                    .ok_or_else(|| self.exhausted(query.mode, offset))?,
            };
        }
    }

    fn event_at(&self, query: BreakoutQuery, offset: usize) -> Result<BreakoutEvent, BreakoutError> {
        let (price, date) = self
            .series
            .close_at(offset)
            .zip(self.series.date_at(offset))
            .ok_or_else(|| self.exhausted(query.mode, offset))?;

        if query.verbose {
            info!(symbol = %self.series.symbol(), "{} breakout price is {price} on {date}", query.mode);
        } else {
            debug!(symbol = %self.series.symbol(), offset, "{} breakout price is {price} on {date}", query.mode);
        }

        Ok(BreakoutEvent {
            mode: query.mode,
            price,
            offset,
            date,
        })
    }

    fn exhausted(&self, mode: BreakoutMode, offset: usize) -> BreakoutError {
        BreakoutError::SearchExhausted {
            symbol: self.series.symbol().to_string(),
            mode,
            offset,
        }
    }
}
