//! Entry screener: fresh breakouts whose previous cycle would have failed.

use super::{screen_each, ScreenError, ScreenSummary, Screened, SymbolError};
use crate::backtest::{last_breakout_failed, CycleParams, CycleVerdict};
use crate::data::{backward_from, DataProvider};
use crate::domain::BreakoutMode;
use crate::rng::SeedSource;
use crate::signals::{trend_duration, BreakoutLocator, DEFAULT_SMOOTHING_PERIOD};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryParams {
    pub mode: BreakoutMode,
    pub num_days_entry: usize,
    pub num_days_exit: usize,
    pub smoothing_period: usize,
    /// Trading days of history replayed by the backtest heuristic.
    pub history_days: usize,
}

impl EntryParams {
    pub fn new(mode: BreakoutMode) -> Self {
        Self {
            mode,
            num_days_entry: 55,
            num_days_exit: 20,
            smoothing_period: DEFAULT_SMOOTHING_PERIOD,
            history_days: 365,
        }
    }

    pub fn cycle_params(&self) -> CycleParams {
        CycleParams {
            mode: self.mode,
            num_days_entry: self.num_days_entry,
            num_days_exit: self.num_days_exit,
            smoothing_period: self.smoothing_period,
        }
    }
}

impl Default for EntryParams {
    fn default() -> Self {
        Self::new(BreakoutMode::Max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryCandidate {
    pub symbol: String,
    /// Consecutive breakout days ending at the analysis date.
    pub trend_duration: usize,
    pub verdict: CycleVerdict,
}

impl Screened for EntryCandidate {
    fn symbol(&self) -> &str {
        &self.symbol
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    NoBreakout,
    PriorCycleSucceeded(CycleVerdict),
    Candidate(EntryCandidate),
}

/// Evaluate one symbol as of `as_of`.
///
/// Only the short entry window is fetched unless the fresh breakout fires.
pub fn evaluate_entry<R: Rng + ?Sized>(
    provider: &dyn DataProvider,
    symbol: &str,
    as_of: NaiveDate,
    params: &EntryParams,
    rng: &mut R,
) -> Result<EntryOutcome, ScreenError> {
    let recent = backward_from(
        provider,
        symbol,
        params.num_days_entry + params.smoothing_period,
        as_of,
    )?;
    let fresh = BreakoutLocator::with_smoothing(&recent, params.smoothing_period).breakout_at(
        params.mode,
        0,
        params.num_days_entry,
    )?;
    if !fresh {
        return Ok(EntryOutcome::NoBreakout);
    }

    let history = backward_from(provider, symbol, params.history_days, as_of)?;
    let verdict = last_breakout_failed(&history, &params.cycle_params(), rng)?;
    if !verdict.failed {
        return Ok(EntryOutcome::PriorCycleSucceeded(verdict));
    }

    let trend_duration = trend_duration(
        params.mode,
        &history,
        params.num_days_entry,
        params.smoothing_period,
    )?;
    Ok(EntryOutcome::Candidate(EntryCandidate {
        symbol: symbol.to_string(),
        trend_duration,
        verdict,
    }))
}

/// Screen `symbols` for entry candidates. Each symbol draws its entry day from
/// `seeds.rng_for(symbol, as_of)`.
pub fn screen_entries(
    provider: &dyn DataProvider,
    symbols: &[&str],
    as_of: NaiveDate,
    params: &EntryParams,
    seeds: &SeedSource,
) -> Result<ScreenSummary<EntryCandidate>, ScreenError> {
    info!(
        provider = provider.name(),
        symbols = symbols.len(),
        mode = %params.mode,
        entry = params.num_days_entry,
        exit = params.num_days_exit,
        %as_of,
        "screening entries"
    );
    screen_each(symbols, |symbol| {
        let mut rng = seeds.rng_for(symbol, as_of);
        match evaluate_entry(provider, symbol, as_of, params, &mut rng)? {
            EntryOutcome::Candidate(candidate) => {
                info!(
                    symbol,
                    trend_duration = candidate.trend_duration,
                    "{}-day {} candidate",
                    params.num_days_entry,
                    params.mode.position_label()
                );
                Ok(Some(candidate))
            }
            EntryOutcome::PriorCycleSucceeded(_) => {
                debug!(symbol, "prior cycle succeeded");
                Ok(None)
            }
            EntryOutcome::NoBreakout => {
                debug!(symbol, "no fresh breakout");
                Ok(None)
            }
        }
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct HuntHit {
    pub params: EntryParams,
    pub candidate: EntryCandidate,
}

#[derive(Debug, Default)]
pub struct HuntReport {
    /// Symbol picks made.
    pub picks: usize,
    pub hits: Vec<HuntHit>,
    pub errors: Vec<SymbolError>,
}

/// Random hunt over `choices` and `symbols`.
///
/// A parameter set is drawn, then symbols are drawn until one is a candidate;
/// after each hit a new parameter set is drawn. Stops after `max_picks`
/// symbol picks.
pub fn hunt<R: Rng + ?Sized>(
    provider: &dyn DataProvider,
    symbols: &[&str],
    as_of: NaiveDate,
    choices: &[EntryParams],
    max_picks: usize,
    rng: &mut R,
    seeds: &SeedSource,
) -> Result<HuntReport, ScreenError> {
    let mut report = HuntReport::default();
    let Some(mut params) = choices.choose(rng).copied() else {
        return Ok(report);
    };
    log_hunt_params(&params);

    while report.picks < max_picks {
        let Some(&symbol) = symbols.choose(rng) else {
            break;
        };
        report.picks += 1;
        debug!(symbol, pick = report.picks, "picked");

        let mut entry_rng = seeds.rng_for(symbol, as_of);
        match evaluate_entry(provider, symbol, as_of, &params, &mut entry_rng) {
            Ok(EntryOutcome::Candidate(candidate)) => {
                info!(
                    symbol,
                    "found {}-day {} candidate",
                    params.num_days_entry,
                    params.mode.position_label()
                );
                report.hits.push(HuntHit { params, candidate });
                if let Some(next) = choices.choose(rng) {
                    params = *next;
                }
                log_hunt_params(&params);
            }
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(symbol, error = %e, "skipping symbol");
                report.errors.push(SymbolError {
                    symbol: symbol.to_string(),
                    error: e,
                });
            }
        }
    }
    Ok(report)
}

fn log_hunt_params(params: &EntryParams) {
    info!(
        mode = %params.mode,
        entry = params.num_days_entry,
        exit = params.num_days_exit,
        "hunting"
    );
}
