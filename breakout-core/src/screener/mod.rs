//! Batch screeners over a symbol list.
//!
//! Each symbol is evaluated independently. A symbol-scoped failure (lookup,
//! malformed data, search exhaustion) is logged and recorded in the summary;
//! only errors that would fail every symbol abort the batch.

pub mod entry;
pub mod exit;

pub use entry::{
    evaluate_entry, hunt, screen_entries, EntryCandidate, EntryOutcome, EntryParams, HuntHit,
    HuntReport,
};
pub use exit::{evaluate_exit, screen_exits, ExitParams, ExitSignal};

use crate::data::DataError;
use crate::signals::BreakoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Breakout(BreakoutError),
}

/// Running out of history during a search is a lookup failure for that
/// symbol, like any other missing span.
impl From<BreakoutError> for ScreenError {
    fn from(err: BreakoutError) -> Self {
        match err {
            BreakoutError::SearchExhausted {
                symbol,
                mode,
                offset,
            } => ScreenError::Data(DataError::RangeUnavailable {
                symbol,
                reason: format!("{mode} breakout search ran out of history at offset {offset}"),
            }),
            other => ScreenError::Breakout(other),
        }
    }
}

impl ScreenError {
    /// True when continuing the batch cannot succeed.
    pub fn is_fatal(&self) -> bool {
        match self {
            ScreenError::Data(e) => e.is_fatal(),
            ScreenError::Breakout(_) => false,
        }
    }
}

/// A symbol that was skipped and why.
#[derive(Debug)]
pub struct SymbolError {
    pub symbol: String,
    pub error: ScreenError,
}

/// Items that belong to one symbol.
pub trait Screened {
    fn symbol(&self) -> &str;
}

/// Result of one screener pass: what was selected, in input order, and which
/// symbols failed.
#[derive(Debug)]
pub struct ScreenSummary<T> {
    pub evaluated: usize,
    pub selected: Vec<T>,
    pub errors: Vec<SymbolError>,
}

impl<T> Default for ScreenSummary<T> {
    fn default() -> Self {
        Self {
            evaluated: 0,
            selected: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T: Screened> ScreenSummary<T> {
    pub fn symbols(&self) -> Vec<&str> {
        self.selected.iter().map(Screened::symbol).collect()
    }
}

impl<T> ScreenSummary<T> {
    pub fn failed_symbols(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.symbol.as_str()).collect()
    }
}

/// Shared per-symbol loop: run `evaluate` for every symbol, keep the `Some`
/// results, record non-fatal errors, stop on a fatal one.
pub(crate) fn screen_each<T>(
    symbols: &[&str],
    mut evaluate: impl FnMut(&str) -> Result<Option<T>, ScreenError>,
) -> Result<ScreenSummary<T>, ScreenError> {
    let mut summary = ScreenSummary::default();
    for &symbol in symbols {
        summary.evaluated += 1;
        match evaluate(symbol) {
            Ok(Some(item)) => summary.selected.push(item),
            Ok(None) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "skipping symbol");
                summary.errors.push(SymbolError {
                    symbol: symbol.to_string(),
                    error: e,
                });
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_stop_the_loop() {
        let mut seen = Vec::new();
        let err = screen_each::<()>(&["A", "B", "C"], |symbol| {
            seen.push(symbol.to_string());
            if symbol == "B" {
                Err(DataError::AuthenticationRequired("no key".into()).into())
            } else {
                Ok(None)
            }
        })
        .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(seen, vec!["A", "B"]);
    }

    #[test]
    fn symbol_errors_are_collected() {
        let summary = screen_each(&["A", "B", "C"], |symbol| match symbol {
            "B" => Err(DataError::SymbolNotFound {
                symbol: symbol.into(),
            }
            .into()),
            _ => Ok(Some(symbol.to_lowercase())),
        })
        .unwrap();
        assert_eq!(summary.evaluated, 3);
        assert_eq!(summary.selected, vec!["a", "c"]);
        assert_eq!(summary.failed_symbols(), vec!["B"]);
    }

    #[test]
    fn breakout_errors_are_not_fatal() {
        let err: ScreenError = BreakoutError::EmptyWindow.into();
        assert!(!err.is_fatal());
        assert!(matches!(err, ScreenError::Breakout(BreakoutError::EmptyWindow)));
    }

    #[test]
    fn exhausted_search_is_a_lookup_failure() {
        let err: ScreenError = BreakoutError::SearchExhausted {
            symbol: "UP".into(),
            mode: crate::domain::BreakoutMode::Min,
            offset: 12,
        }
        .into();
        assert!(!err.is_fatal());
        match err {
            ScreenError::Data(DataError::RangeUnavailable { symbol, reason }) => {
                assert_eq!(symbol, "UP");
                assert!(reason.contains("offset 12"));
            }
            other => panic!("expected RangeUnavailable, got {other:?}"),
        }
    }
}
