//! Trend duration: how long the current breakout has persisted.

use super::{BreakoutError, BreakoutLocator};
use crate::domain::{BreakoutMode, PriceSeries};

/// Number of consecutive backward steps, starting at offset 0, for which the
/// breakout condition held.
///
/// Returns 0 when the most recent day is not a breakout, 1 when only the most
/// recent day is, and so on. A streak that runs into the start of history
/// stops there.
pub fn trend_duration(
    mode: BreakoutMode,
    series: &PriceSeries,
    num_days: usize,
    smoothing_period: usize,
) -> Result<usize, BreakoutError> {
    let locator = BreakoutLocator::with_smoothing(series, smoothing_period);
    let mut offset = 0;
    loop {
        match locator.breakout_at(mode, offset, num_days) {
            Ok(true) => offset += 1,
            Ok(false) | Err(BreakoutError::SearchExhausted { .. }) => return Ok(offset),
            Err(e) => return Err(e),
        }
    }
}
