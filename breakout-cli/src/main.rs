//! Breakout CLI: entry screening and exit detection.
//!
//! Commands:
//! - `screen`: list symbols with a fresh breakout whose previous cycle failed
//! - `detect-exit`: list open positions whose opposite breakout just fired
//!
//! Data comes from AlphaVantage through a daily JSON cache. Results go to
//! stdout; logs go to stderr.

use anyhow::{bail, Context, Result};
use breakout_core::config::{ScreenerConfig, Timeframe};
use breakout_core::data::{
    AlphaVantageProvider, CachedProvider, DailyCache, DataProvider, PositionBook, SymbolList,
};
use breakout_core::domain::BreakoutMode;
use breakout_core::rng::SeedSource;
use breakout_core::screener::{hunt, screen_entries, screen_exits, ScreenSummary};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "breakout",
    about = "Breakout screener: smoothed-close entry and exit signals"
)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a symbol list for entry candidates.
    Screen {
        /// Symbol list (JSON array or TOML `symbols = [...]`).
        #[arg(long)]
        symbols: Option<PathBuf>,

        /// Breakout mode: max (long) or min (short). Both when omitted.
        #[arg(long)]
        mode: Option<BreakoutMode>,

        /// Entry lookback in trading days (overrides configured timeframes).
        #[arg(long, requires = "exit")]
        entry: Option<usize>,

        /// Exit lookback in trading days.
        #[arg(long, requires = "entry")]
        exit: Option<usize>,

        /// Analysis date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Pick random timeframe, mode, and symbol until a candidate is found.
        #[arg(long, default_value_t = false)]
        hunt: bool,

        /// Maximum symbol picks in hunt mode.
        #[arg(long, default_value_t = 25)]
        max_picks: usize,

        /// Seed for reproducible entry-day draws.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check open positions for exit signals.
    DetectExit {
        /// Positions file (TOML `[[positions]]` groups).
        #[arg(long)]
        positions: Option<PathBuf>,

        /// Analysis date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ScreenerConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Screen {
            symbols,
            mode,
            entry,
            exit,
            date,
            hunt,
            max_picks,
            seed,
        } => {
            let timeframe = entry.zip(exit).map(|(entry, exit)| Timeframe { entry, exit });
            let opts = ScreenOpts {
                symbols,
                mode,
                timeframe,
                date,
                hunt,
                max_picks,
                seed,
            };
            run_screen(&config, opts)
        }
        Commands::DetectExit { positions, date } => run_detect_exit(&config, positions, date),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,breakout_core=debug")
    } else {
        EnvFilter::new("info,breakout_core=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();
}

/// Analysis date from the flag, or today at invocation.
fn analysis_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --date '{s}', expected YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn build_provider(config: &ScreenerConfig) -> Result<CachedProvider<AlphaVantageProvider>> {
    let data = &config.data;
    let remote = AlphaVantageProvider::from_env(&data.api_key_env, data.request_interval())?
        .with_max_retries(data.max_retries);
    if !remote.is_available() {
        warn!(
            var = %data.api_key_env,
            "no API key set; only symbols cached today can be screened"
        );
    }
    let cache = DailyCache::new(&data.cache_dir, chrono::Local::now().date_naive());
    Ok(CachedProvider::new(remote, cache))
}

struct ScreenOpts {
    symbols: Option<PathBuf>,
    mode: Option<BreakoutMode>,
    timeframe: Option<Timeframe>,
    date: Option<String>,
    hunt: bool,
    max_picks: usize,
    seed: Option<u64>,
}

fn run_screen(config: &ScreenerConfig, opts: ScreenOpts) -> Result<()> {
    let as_of = analysis_date(opts.date.as_deref())?;
    let symbols_path = opts.symbols.unwrap_or_else(|| config.paths.symbols.clone());
    let list = SymbolList::from_file(&symbols_path)?;
    if list.is_empty() {
        bail!("symbol list {} is empty", symbols_path.display());
    }
    let symbols = list.as_strs();

    let timeframes = match opts.timeframe {
        Some(tf) => vec![tf],
        None => config.screen.timeframes.clone(),
    };
    let modes = match opts.mode {
        Some(mode) => vec![mode],
        None => BreakoutMode::ALL.to_vec(),
    };
    let seeds = SeedSource::from_option(opts.seed);
    let provider = build_provider(config)?;

    if opts.hunt {
        let choices: Vec<_> = timeframes
            .iter()
            .flat_map(|&tf| modes.iter().map(move |&mode| config.entry_params(mode, tf)))
            .collect();
        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let report = hunt(
            &provider,
            &symbols,
            as_of,
            &choices,
            opts.max_picks,
            &mut rng,
            &seeds,
        )?;
        for hit in &report.hits {
            println!(
                "Found {}-day {} candidate: {} (trend {} days, prior entry {} exited at {})",
                hit.params.num_days_entry,
                hit.params.mode.position_label(),
                hit.candidate.symbol,
                hit.candidate.trend_duration,
                hit.candidate.verdict.entry_price,
                hit.candidate.verdict.exit.price,
            );
        }
        if report.hits.is_empty() {
            println!("No candidate found after {} picks", report.picks);
        }
        return Ok(());
    }

    for tf in &timeframes {
        for &mode in &modes {
            let params = config.entry_params(mode, *tf);
            let summary = screen_entries(&provider, &symbols, as_of, &params, &seeds)?;
            let listed: Vec<String> = summary
                .selected
                .iter()
                .map(|c| format!("{} ({}d)", c.symbol, c.trend_duration))
                .collect();
            println!(
                "{}-day {} candidates: {}",
                tf.entry,
                mode.position_label(),
                listed.join(", ")
            );
            report_skipped(&summary);
        }
    }
    Ok(())
}

fn run_detect_exit(
    config: &ScreenerConfig,
    positions: Option<PathBuf>,
    date: Option<String>,
) -> Result<()> {
    let as_of = analysis_date(date.as_deref())?;
    let path = positions.unwrap_or_else(|| config.paths.positions.clone());
    let book = PositionBook::from_file(&path)?;
    info!(groups = book.positions.len(), symbols = book.symbol_count(), "loaded positions");
    let provider = build_provider(config)?;

    for group in &book.positions {
        let params = config.exit_params(group.mode, group.timeframe);
        let symbols: Vec<&str> = group.symbols.iter().map(String::as_str).collect();
        let summary = screen_exits(&provider, &symbols, as_of, &params)?;
        println!(
            "{}-day {} positions to consider exiting: {}",
            group.timeframe,
            group.mode.position_label(),
            summary.symbols().join(", ")
        );
        report_skipped(&summary);
    }
    Ok(())
}

fn report_skipped<T>(summary: &ScreenSummary<T>) {
    if !summary.errors.is_empty() {
        eprintln!(
            "  skipped {} of {} symbols: {}",
            summary.errors.len(),
            summary.evaluated,
            summary.failed_symbols().join(", ")
        );
    }
}
