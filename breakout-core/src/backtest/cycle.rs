//! Prior-cycle search: brackets the previous entry breakout run.
//!
//! Four locator steps, each starting where the previous one stopped:
//!
//! ```text
//! SeekExitPrecursor --exit mode, backward from 0------------> SeekNearEntry
//! SeekNearEntry     --entry mode, backward------------------> SeekAntefarExit
//! SeekAntefarExit   --exit mode, backward from near---------> SeekFarEntry
//! SeekFarEntry      --entry mode, forward from antefar------> Bracketed
//! ```
//!
//! `near` is the last entry breakout before the most recent exit signal and
//! `far` the first entry breakout of that same run.

use crate::domain::{BreakoutMode, PriceSeries};
use crate::signals::{
    BreakoutError, BreakoutLocator, BreakoutQuery, DEFAULT_SMOOTHING_PERIOD,
};

/// Window widths and smoothing shared by every step of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleParams {
    pub mode: BreakoutMode,
    pub num_days_entry: usize,
    pub num_days_exit: usize,
    pub smoothing_period: usize,
}

impl CycleParams {
    pub fn new(mode: BreakoutMode) -> Self {
        Self {
            mode,
            num_days_entry: 55,
            num_days_exit: 20,
            smoothing_period: DEFAULT_SMOOTHING_PERIOD,
        }
    }

    pub fn exit_mode(&self) -> BreakoutMode {
        self.mode.opposite()
    }
}

impl Default for CycleParams {
    fn default() -> Self {
        Self::new(BreakoutMode::Max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    SeekExitPrecursor,
    SeekNearEntry { precursor: usize },
    SeekAntefarExit { near: usize },
    SeekFarEntry { near: usize, antefar: usize },
    Bracketed(Bracket),
}

/// Offsets delimiting the previous entry run. `far >= near` in practice;
/// `range()` orders them regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub near: usize,
    pub far: usize,
}

impl Bracket {
    pub fn range(&self) -> std::ops::RangeInclusive<usize> {
        self.near.min(self.far)..=self.near.max(self.far)
    }
}

/// Stepwise driver for the four-step search.
#[derive(Debug, Clone)]
pub struct CycleSearch<'a> {
    locator: BreakoutLocator<'a>,
    params: CycleParams,
    state: CycleState,
}

impl<'a> CycleSearch<'a> {
    pub fn new(series: &'a PriceSeries, params: CycleParams) -> Self {
        Self::resume(series, params, CycleState::SeekExitPrecursor)
    }

    /// Start from an arbitrary state, e.g. to exercise one transition.
    pub fn resume(series: &'a PriceSeries, params: CycleParams, state: CycleState) -> Self {
        Self {
            locator: BreakoutLocator::with_smoothing(series, params.smoothing_period),
            params,
            state,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Perform one transition. `Bracketed` is terminal and returned unchanged.
    pub fn step(&mut self) -> Result<CycleState, BreakoutError> {
        let p = self.params;
        let next = match self.state {
            CycleState::SeekExitPrecursor => {
                let precursor = self.offset_of(BreakoutQuery::backward(
                    p.exit_mode(),
                    0,
                    p.num_days_exit,
                ))?;
                CycleState::SeekNearEntry { precursor }
            }
            CycleState::SeekNearEntry { precursor } => {
                let near = self.offset_of(BreakoutQuery::backward(
                    p.mode,
                    precursor,
                    p.num_days_entry,
                ))?;
                CycleState::SeekAntefarExit { near }
            }
            CycleState::SeekAntefarExit { near } => {
                let antefar = self.offset_of(BreakoutQuery::backward(
                    p.exit_mode(),
                    near,
                    p.num_days_exit,
                ))?;
                CycleState::SeekFarEntry { near, antefar }
            }
            CycleState::SeekFarEntry { near, antefar } => {
                let far = self.offset_of(BreakoutQuery::forward(
                    p.mode,
                    antefar,
                    p.num_days_entry,
                ))?;
                CycleState::Bracketed(Bracket { near, far })
            }
            done @ CycleState::Bracketed(_) => done,
        };
        self.state = next;
        Ok(next)
    }

    /// Step until bracketed.
    pub fn run(mut self) -> Result<Bracket, BreakoutError> {
        loop {
            if let CycleState::Bracketed(bracket) = self.step()? {
                return Ok(bracket);
            }
        }
    }

    fn offset_of(&self, query: BreakoutQuery) -> Result<usize, BreakoutError> {
        self.locator.locate(query).map(|event| event.offset)
    }
}
