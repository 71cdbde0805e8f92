//! Exit screener: open positions whose opposite breakout just fired.

use super::{screen_each, ScreenError, ScreenSummary, Screened};
use crate::data::{backward_from, DataError, DataProvider};
use crate::domain::BreakoutMode;
use crate::signals::{BreakoutLocator, DEFAULT_SMOOTHING_PERIOD};
use chrono::NaiveDate;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitParams {
    /// Direction of the open positions; the exit fires on the opposite mode.
    pub mode: BreakoutMode,
    pub num_days_exit: usize,
    pub smoothing_period: usize,
}

impl ExitParams {
    pub fn new(mode: BreakoutMode) -> Self {
        Self {
            mode,
            num_days_exit: 20,
            smoothing_period: DEFAULT_SMOOTHING_PERIOD,
        }
    }

    pub fn exit_mode(&self) -> BreakoutMode {
        self.mode.opposite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExitSignal {
    pub symbol: String,
    /// Close on the analysis day.
    pub price: f64,
    pub date: NaiveDate,
}

impl Screened for ExitSignal {
    fn symbol(&self) -> &str {
        &self.symbol
    }
}

pub fn evaluate_exit(
    provider: &dyn DataProvider,
    symbol: &str,
    as_of: NaiveDate,
    params: &ExitParams,
) -> Result<Option<ExitSignal>, ScreenError> {
    let recent = backward_from(
        provider,
        symbol,
        params.num_days_exit + params.smoothing_period,
        as_of,
    )?;
    let fired = BreakoutLocator::with_smoothing(&recent, params.smoothing_period).breakout_at(
        params.exit_mode(),
        0,
        params.num_days_exit,
    )?;
    if !fired {
        return Ok(None);
    }

    let (price, date) = recent
        .close_at(0)
        .zip(recent.date_at(0))
        .ok_or_else(|| DataError::RangeUnavailable {
            symbol: symbol.to_string(),
            reason: "no bars on or before the analysis date".into(),
        })?;
    Ok(Some(ExitSignal {
        symbol: symbol.to_string(),
        price,
        date,
    }))
}

pub fn screen_exits(
    provider: &dyn DataProvider,
    symbols: &[&str],
    as_of: NaiveDate,
    params: &ExitParams,
) -> Result<ScreenSummary<ExitSignal>, ScreenError> {
    info!(
        provider = provider.name(),
        symbols = symbols.len(),
        mode = %params.mode,
        exit = params.num_days_exit,
        %as_of,
        "screening exits"
    );
    screen_each(symbols, |symbol| {
        let signal = evaluate_exit(provider, symbol, as_of, params)?;
        match &signal {
            Some(s) => info!(symbol, price = s.price, date = %s.date, "exit signal"),
            None => debug!(symbol, "no exit signal"),
        }
        Ok(signal)
    })
}
