//! Breakout Core: smoothed-close breakout detection and screening.
//!
//! This crate contains the screening logic behind the `breakout` CLI:
//! - Domain types (daily bars, price series, breakout mode)
//! - Exponential smoothing by convolution
//! - Breakout detection, location, and trend duration
//! - The "would the last breakout have failed" backtest heuristic
//! - Entry and exit screeners over a symbol list
//! - Data providers (AlphaVantage, daily JSON cache, in-memory) and config

pub mod backtest;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod rng;
pub mod screener;
pub mod signals;
pub mod synthetic;
