//! Synthetic close series with hand-designed breakout cycles.
//!
//! Tuned for entry window 5, exit window 3 and smoothing period 2 (see
//! [`cycle_params`]). Dates run on consecutive calendar days from 2024-01-01.
//! Used by tests, benches, and the offline provider.

use crate::backtest::CycleParams;
use crate::domain::{BreakoutMode, PriceSeries};
use chrono::NaiveDate;

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("2024-01-01 is a valid date")
}

/// Window widths the synthetic cycles are designed for.
pub fn cycle_params(mode: BreakoutMode) -> CycleParams {
    CycleParams {
        num_days_entry: 5,
        num_days_exit: 3,
        ..CycleParams::new(mode)
    }
}

/// Decline 80..61, three-day plateau at 100, then a slide 90..85.
///
/// The previous long cycle enters on the plateau (offsets 6..=8 of the
/// 29-bar series, all at 100) and exits on the first day of the slide at 90.
pub fn failed_long_closes() -> Vec<f64> {
    (0..20)
        .map(|i| 80.0 - i as f64)
        .chain([100.0; 3])
        .chain((0..6).map(|i| 90.0 - i as f64))
        .collect()
}

/// Flat at 90, dip to 40, spike to 120, one entry day at 100, four days at
/// 105, a slide 95..91, then a jump to 200.
///
/// The previous long cycle is the single entry day at 100 and exits at 105,
/// so it made money. The last day is a fresh high.
pub fn successful_long_closes() -> Vec<f64> {
    [90.0; 12]
        .into_iter()
        .chain([40.0, 120.0, 100.0])
        .chain([105.0; 4])
        .chain((0..5).map(|i| 95.0 - i as f64))
        .chain([200.0])
        .collect()
}

/// Appends a jump to 200, which is a fresh high for every series here.
pub fn with_fresh_high(mut closes: Vec<f64>) -> Vec<f64> {
    closes.push(200.0);
    closes
}

/// Reflect closes around 100 so highs become lows.
pub fn mirrored(closes: &[f64]) -> Vec<f64> {
    closes.iter().map(|c| 200.0 - c).collect()
}

pub fn failed_long_cycle() -> PriceSeries {
    PriceSeries::from_daily_closes("FAIL", start_date(), &failed_long_closes())
}

/// Mirror of [`failed_long_cycle`]: short entry at 100, exit at 110.
pub fn failed_short_cycle() -> PriceSeries {
    PriceSeries::from_daily_closes("FAILS", start_date(), &mirrored(&failed_long_closes()))
}

pub fn successful_long_cycle() -> PriceSeries {
    PriceSeries::from_daily_closes("WIN", start_date(), &successful_long_closes())
}
