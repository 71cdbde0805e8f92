//! "Would the last breakout have failed" heuristic.
//!
//! Given a fresh breakout, look at the previous run of entry breakouts of the
//! same mode, assume a position was opened at a random day inside that run,
//! and closed at the first exit breakout after it. The cycle failed if that
//! trade lost money. Screeners only act on fresh breakouts whose previous
//! cycle failed.

pub mod cycle;

pub use cycle::{Bracket, CycleParams, CycleSearch, CycleState};

use crate::domain::{BreakoutMode, PriceSeries};
use crate::signals::{BreakoutError, BreakoutEvent, BreakoutLocator, BreakoutQuery};
use chrono::NaiveDate;
use rand::Rng;
use tracing::info;

/// Outcome of replaying the previous cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleVerdict {
    pub mode: BreakoutMode,
    pub bracket: Bracket,
    pub entry_offset: usize,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub exit: BreakoutEvent,
    pub failed: bool,
}

/// Whether a trade opened at `entry` and closed at `exit` lost money: a long
/// (`Max`) loses when the exit is lower, a short (`Min`) when it is higher.
pub fn cycle_failed(mode: BreakoutMode, entry: f64, exit: f64) -> bool {
    match mode {
        BreakoutMode::Max => exit < entry,
        BreakoutMode::Min => exit > entry,
    }
}

/// Replay the previous cycle of `params.mode` breakouts in `series`.
///
/// The entry day is drawn uniformly from the bracket using `rng`.
pub fn last_breakout_failed<R: Rng + ?Sized>(
    series: &PriceSeries,
    params: &CycleParams,
    rng: &mut R,
) -> Result<CycleVerdict, BreakoutError> {
    let bracket = CycleSearch::new(series, *params).run()?;
    let locator = BreakoutLocator::with_smoothing(series, params.smoothing_period);
    let exhausted = |offset| BreakoutError::SearchExhausted {
        symbol: series.symbol().to_string(),
        mode: params.mode,
        offset,
    };

    let day = |offset: usize| {
        series
            .close_at(offset)
            .zip(series.date_at(offset))
            .ok_or_else(|| exhausted(offset))
    };
    let (far_price, far_date) = day(bracket.far)?;
    let (near_price, near_date) = day(bracket.near)?;
    info!(
        symbol = %series.symbol(),
        "furthest back {} is {far_price} on {far_date} and the nearest is {near_price} on {near_date}",
        params.mode
    );

    let entry_offset = rng.gen_range(bracket.range());
    let (entry_price, entry_date) = day(entry_offset)?;
    info!(symbol = %series.symbol(), "selected entry price {entry_price} on {entry_date}");

    let exit = locator.locate(
        BreakoutQuery::forward(params.exit_mode(), bracket.near, params.num_days_exit).verbose(true),
    )?;

    Ok(CycleVerdict {
        mode: params.mode,
        bracket,
        entry_offset,
        entry_price,
        entry_date,
        exit,
        failed: cycle_failed(params.mode, entry_price, exit.price),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn verdict_rules() {
        assert!(cycle_failed(BreakoutMode::Max, 100.0, 90.0));
        assert!(!cycle_failed(BreakoutMode::Max, 100.0, 110.0));
        assert!(cycle_failed(BreakoutMode::Min, 100.0, 110.0));
        assert!(!cycle_failed(BreakoutMode::Min, 100.0, 90.0));
        // flat exit is not a loss either way
        assert!(!cycle_failed(BreakoutMode::Max, 100.0, 100.0));
        assert!(!cycle_failed(BreakoutMode::Min, 100.0, 100.0));
    }

    #[test]
    fn failed_long_cycle_fails_for_every_seed() {
        let series = synthetic::failed_long_cycle();
        let params = synthetic::cycle_params(BreakoutMode::Max);
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let verdict = last_breakout_failed(&series, &params, &mut rng).unwrap();
            assert!(verdict.failed);
            assert_eq!(verdict.entry_price, 100.0);
            assert_eq!(verdict.exit.price, 90.0);
            assert!(verdict.bracket.range().contains(&verdict.entry_offset));
        }
    }

    #[test]
    fn failed_short_cycle_fails() {
        let series = synthetic::failed_short_cycle();
        let params = synthetic::cycle_params(BreakoutMode::Min);
        let verdict = last_breakout_failed(&series, &params, &mut StepRng::new(0, 1)).unwrap();
        assert!(verdict.failed);
        assert_eq!(verdict.entry_price, 100.0);
        assert_eq!(verdict.exit.price, 110.0);
        assert_eq!(verdict.exit.mode, BreakoutMode::Max);
    }

    #[test]
    fn successful_long_cycle_does_not_fail() {
        let series = synthetic::successful_long_cycle();
        let params = synthetic::cycle_params(BreakoutMode::Max);
        let verdict =
            last_breakout_failed(&series, &params, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(verdict.bracket.near, verdict.bracket.far);
        assert_eq!(verdict.entry_price, 100.0);
        assert_eq!(verdict.exit.price, 105.0);
        assert!(!verdict.failed);
    }

    #[test]
    fn verdict_agrees_with_price_ordering() {
        let series = synthetic::successful_long_cycle();
        let params = synthetic::cycle_params(BreakoutMode::Max);
        for seed in 0..16 {
            let v = last_breakout_failed(&series, &params, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(v.failed, v.exit.price < v.entry_price);
            assert_eq!(series.close_at(v.entry_offset), Some(v.entry_price));
        }
    }
}
