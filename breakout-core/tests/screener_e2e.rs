//! End-to-end screener runs over an in-memory universe of synthetic cycles.
//!
//! Windows are entry 5, exit 3, smoothing 2, with 24 days of history, so the
//! designed cycles in `breakout_core::synthetic` drive the outcome.

use breakout_core::data::{DataError, DataProvider, FetchResult, InMemoryProvider};
use breakout_core::domain::{daily_bars, BreakoutMode};
use breakout_core::rng::SeedSource;
use breakout_core::screener::{
    screen_entries, screen_exits, EntryParams, ExitParams, ScreenError,
};
use breakout_core::synthetic::{
    failed_long_closes, mirrored, successful_long_closes, with_fresh_high,
};
use chrono::{Duration, NaiveDate};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

/// Bars on consecutive calendar days, the last one on the analysis date.
fn ending_on_as_of(symbol: &str, closes: &[f64], provider: &mut InMemoryProvider) {
    let start = as_of() - Duration::days(closes.len() as i64 - 1);
    provider.insert(symbol, daily_bars(start, closes));
}

fn universe() -> InMemoryProvider {
    let mut provider = InMemoryProvider::new();
    ending_on_as_of("FAIL", &with_fresh_high(failed_long_closes()), &mut provider);
    ending_on_as_of("WIN", &successful_long_closes(), &mut provider);
    ending_on_as_of("FLAT", &failed_long_closes(), &mut provider);
    let short_side = mirrored(&with_fresh_high(failed_long_closes()));
    ending_on_as_of("FAILS", &short_side, &mut provider);
    provider
}

fn entry_params(mode: BreakoutMode) -> EntryParams {
    EntryParams {
        num_days_entry: 5,
        num_days_exit: 3,
        history_days: 24,
        ..EntryParams::new(mode)
    }
}

fn exit_params(mode: BreakoutMode) -> ExitParams {
    ExitParams {
        num_days_exit: 3,
        ..ExitParams::new(mode)
    }
}

// ── Entry screener ───────────────────────────────────────────────────

#[test]
fn long_entries_keep_only_failed_prior_cycles() {
    let summary = screen_entries(
        &universe(),
        &["FAIL", "WIN", "FLAT"],
        as_of(),
        &entry_params(BreakoutMode::Max),
        &SeedSource::seeded(11),
    )
    .unwrap();

    assert_eq!(summary.evaluated, 3);
    assert_eq!(summary.symbols(), vec!["FAIL"]);
    assert!(summary.errors.is_empty());

    let candidate = &summary.selected[0];
    assert_eq!(candidate.trend_duration, 1);
    assert!(candidate.verdict.failed);
    assert_eq!(candidate.verdict.entry_price, 100.0);
    assert_eq!(candidate.verdict.exit.price, 90.0);
}

#[test]
fn short_entries_use_the_mirrored_cycle() {
    let summary = screen_entries(
        &universe(),
        &["FAILS", "FAIL"],
        as_of(),
        &entry_params(BreakoutMode::Min),
        &SeedSource::seeded(5),
    )
    .unwrap();

    assert_eq!(summary.symbols(), vec!["FAILS"]);
    let verdict = &summary.selected[0].verdict;
    assert_eq!(verdict.entry_price, 100.0);
    assert_eq!(verdict.exit.price, 110.0);
    assert_eq!(verdict.exit.mode, BreakoutMode::Max);
}

#[test]
fn unknown_symbols_are_skipped_not_fatal() {
    let summary = screen_entries(
        &universe(),
        &["NOPE", "FAIL"],
        as_of(),
        &entry_params(BreakoutMode::Max),
        &SeedSource::Entropy,
    )
    .unwrap();

    assert_eq!(summary.symbols(), vec!["FAIL"]);
    assert_eq!(summary.failed_symbols(), vec!["NOPE"]);
    assert!(matches!(
        summary.errors[0].error,
        ScreenError::Data(DataError::SymbolNotFound { .. })
    ));
}

#[test]
fn seeded_runs_draw_the_same_entry_day() {
    let run = || {
        let summary = screen_entries(
            &universe(),
            &["FAIL"],
            as_of(),
            &entry_params(BreakoutMode::Max),
            &SeedSource::seeded(99),
        )
        .unwrap();
        summary.selected[0].verdict.entry_offset
    };
    assert_eq!(run(), run());
}

#[test]
fn selection_preserves_input_order() {
    let mut provider = universe();
    ending_on_as_of("FAIL2", &with_fresh_high(failed_long_closes()), &mut provider);
    let summary = screen_entries(
        &provider,
        &["FAIL2", "WIN", "FAIL"],
        as_of(),
        &entry_params(BreakoutMode::Max),
        &SeedSource::seeded(1),
    )
    .unwrap();
    assert_eq!(summary.symbols(), vec!["FAIL2", "FAIL"]);
}

#[test]
fn exhausted_search_skips_the_symbol_and_the_batch_continues() {
    let mut provider = universe();
    let rising: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
    ending_on_as_of("UP", &rising, &mut provider);

    let summary = screen_entries(
        &provider,
        &["UP", "FAIL"],
        as_of(),
        &entry_params(BreakoutMode::Max),
        &SeedSource::seeded(3),
    )
    .unwrap();

    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.symbols(), vec!["FAIL"]);
    assert_eq!(summary.failed_symbols(), vec!["UP"]);
    match &summary.errors[0].error {
        ScreenError::Data(DataError::RangeUnavailable { symbol, reason }) => {
            assert_eq!(symbol, "UP");
            assert!(reason.contains("breakout search"));
        }
        other => panic!("expected RangeUnavailable, got {other:?}"),
    }
}

/// Delegates to the synthetic universe but serves a bad payload for `BAD`.
struct MalformedFor<'a> {
    inner: &'a InMemoryProvider,
}

impl DataProvider for MalformedFor<'_> {
    fn name(&self) -> &str {
        "malformed"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        if symbol == "BAD" {
            return Err(DataError::MalformedData {
                symbol: symbol.into(),
                date: as_of().to_string(),
                field: "close",
                reason: "not a number".into(),
            });
        }
        self.inner.fetch(symbol, start, end)
    }
}

#[test]
fn malformed_data_skips_the_symbol_and_the_batch_continues() {
    let universe = universe();
    let provider = MalformedFor { inner: &universe };

    let entries = screen_entries(
        &provider,
        &["BAD", "FAIL"],
        as_of(),
        &entry_params(BreakoutMode::Max),
        &SeedSource::seeded(3),
    )
    .unwrap();
    assert_eq!(entries.symbols(), vec!["FAIL"]);
    assert_eq!(entries.failed_symbols(), vec!["BAD"]);
    assert!(matches!(
        entries.errors[0].error,
        ScreenError::Data(DataError::MalformedData { field: "close", .. })
    ));

    let exits = screen_exits(
        &provider,
        &["BAD", "FLAT"],
        as_of(),
        &exit_params(BreakoutMode::Max),
    )
    .unwrap();
    assert_eq!(exits.symbols(), vec!["FLAT"]);
    assert_eq!(exits.failed_symbols(), vec!["BAD"]);
}

// ── Exit screener ────────────────────────────────────────────────────

#[test]
fn long_positions_exit_on_fresh_low() {
    let summary = screen_exits(
        &universe(),
        &["FLAT", "WIN"],
        as_of(),
        &exit_params(BreakoutMode::Max),
    )
    .unwrap();

    assert_eq!(summary.symbols(), vec!["FLAT"]);
    let signal = &summary.selected[0];
    assert_eq!(signal.price, 85.0);
    assert_eq!(signal.date, as_of());
}

#[test]
fn short_positions_exit_on_fresh_high() {
    let summary = screen_exits(
        &universe(),
        &["FAIL", "FLAT"],
        as_of(),
        &exit_params(BreakoutMode::Min),
    )
    .unwrap();
    assert_eq!(summary.symbols(), vec!["FAIL"]);
    assert_eq!(summary.selected[0].price, 200.0);
}

// ── Fatal errors ─────────────────────────────────────────────────────

struct NoKeyProvider;

impl DataProvider for NoKeyProvider {
    fn name(&self) -> &str {
        "no_key"
    }

    fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
        Err(DataError::AuthenticationRequired("no API key".into()))
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[test]
fn missing_credentials_abort_the_batch() {
    let err = screen_entries(
        &NoKeyProvider,
        &["SPY", "QQQ"],
        as_of(),
        &entry_params(BreakoutMode::Max),
        &SeedSource::Entropy,
    )
    .unwrap_err();
    assert!(err.is_fatal());

    let err = screen_exits(&NoKeyProvider, &["SPY"], as_of(), &exit_params(BreakoutMode::Max))
        .unwrap_err();
    assert!(err.is_fatal());
}
