//! `backward_from`: the trailing N trading days ending at a date.
//!
//! Providers are queried by calendar range, so a request for N trading days
//! starts N calendar days back and widens by the shortfall until enough bars
//! come back. If the result stops growing for [`MAX_STALLED_ATTEMPTS`]
//! consecutive widenings the range is reported unavailable.

use super::provider::{DataError, DataProvider};
use crate::domain::PriceSeries;
use chrono::{Duration, NaiveDate};
use tracing::debug;

pub const MAX_STALLED_ATTEMPTS: u32 = 20;

/// At least `num_days` bars for `symbol` ending on or before `from_date`.
///
/// Returns every bar in the final widened range; callers window from the end.
pub fn backward_from(
    provider: &dyn DataProvider,
    symbol: &str,
    num_days: usize,
    from_date: NaiveDate,
) -> Result<PriceSeries, DataError> {
    let mut start = from_date - Duration::days(num_days as i64);
    let mut bars = provider.fetch(symbol, start, from_date)?.bars;
    let mut stalled = 0;
    let mut previous_len = 0;

    while bars.len() < num_days {
        let shortfall = num_days - bars.len();
        start -= Duration::days(shortfall as i64);
        bars = provider.fetch(symbol, start, from_date)?.bars;

        stalled = if bars.len() == previous_len { stalled + 1 } else { 0 };
        previous_len = bars.len();
        debug!(symbol, start = %start, bars = bars.len(), stalled, "widened lookup range");

        if stalled >= MAX_STALLED_ATTEMPTS {
            return Err(DataError::RangeUnavailable {
                symbol: symbol.to_string(),
                reason: format!("needed {num_days} trading days, found {}", bars.len()),
            });
        }
    }

    Ok(PriceSeries::new(symbol, bars)?)
}
