//! Domain types for breakout screening.

pub mod bar;
pub mod mode;
pub mod series;

pub use bar::{daily_bars, DailyBar};
pub use mode::{BreakoutMode, InvalidMode};
pub use series::{PriceSeries, SeriesError};
