//! Breakout signals on smoothed close windows.
//!
//! A breakout at offset `o` for window width `n` holds when, after taking the
//! `n + smoothing_period` closes ending at `o`, smoothing them and dropping the
//! warm-up entries, the last smoothed value is the window's extreme.

pub mod extremum;
pub mod locator;
pub mod trend;

pub use extremum::detected;
pub use locator::{BreakoutEvent, BreakoutLocator, BreakoutQuery, StepDirection};
pub use trend::trend_duration;

use crate::domain::{BreakoutMode, InvalidMode};
use thiserror::Error;

/// Smoothing period used when callers do not pick one.
pub const DEFAULT_SMOOTHING_PERIOD: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BreakoutError {
    #[error(transparent)]
    InvalidMode(#[from] InvalidMode),

    #[error("breakout search for {symbol} ({mode}) ran out of history at offset {offset}")]
    SearchExhausted {
        symbol: String,
        mode: BreakoutMode,
        offset: usize,
    },

    #[error("breakout window must span at least one day")]
    EmptyWindow,
}
