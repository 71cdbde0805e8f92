//! Screener configuration loaded from TOML.
//!
//! Every section and field has a default, so an empty file (or no file) is a
//! valid configuration.

use crate::data::DEFAULT_API_KEY_VAR;
use crate::domain::BreakoutMode;
use crate::screener::{EntryParams, ExitParams};
use crate::signals::DEFAULT_SMOOTHING_PERIOD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    pub data: DataConfig,
    pub screen: ScreenConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Name of the environment variable holding the AlphaVantage key.
    pub api_key_env: String,
    pub cache_dir: PathBuf,
    /// Minimum spacing between provider requests.
    pub request_interval_secs: u64,
    pub max_retries: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_VAR.to_string(),
            cache_dir: PathBuf::from("data/cache"),
            request_interval_secs: 12,
            max_retries: 3,
        }
    }
}

impl DataConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_secs(self.request_interval_secs)
    }
}

/// Entry/exit lookback pair in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub entry: usize,
    pub exit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub smoothing_period: usize,
    /// Trading days of history fetched for the backtest heuristic.
    pub history_days: usize,
    pub timeframes: Vec<Timeframe>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            smoothing_period: DEFAULT_SMOOTHING_PERIOD,
            history_days: 365,
            timeframes: vec![
                Timeframe { entry: 20, exit: 10 },
                Timeframe { entry: 55, exit: 20 },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub symbols: PathBuf,
    pub positions: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            symbols: PathBuf::from("data/static/symbols.json"),
            positions: PathBuf::from("data/static/positions.toml"),
        }
    }
}

impl ScreenerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ScreenerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.timeframes.is_empty() {
            return Err(ConfigError::Invalid("screen.timeframes is empty".into()));
        }
        if let Some(tf) = self
            .screen
            .timeframes
            .iter()
            .find(|tf| tf.entry == 0 || tf.exit == 0)
        {
            return Err(ConfigError::Invalid(format!(
                "timeframe {}/{} has a zero-day window",
                tf.entry, tf.exit
            )));
        }
        let longest = self
            .screen
            .timeframes
            .iter()
            .map(|tf| tf.entry.max(tf.exit))
            .max()
            .unwrap_or(0);
        if self.screen.history_days <= longest + self.screen.smoothing_period {
            return Err(ConfigError::Invalid(format!(
                "screen.history_days ({}) must exceed the longest window plus smoothing ({})",
                self.screen.history_days,
                longest + self.screen.smoothing_period
            )));
        }
        Ok(())
    }

    pub fn entry_params(&self, mode: BreakoutMode, timeframe: Timeframe) -> EntryParams {
        EntryParams {
            mode,
            num_days_entry: timeframe.entry,
            num_days_exit: timeframe.exit,
            smoothing_period: self.screen.smoothing_period,
            history_days: self.screen.history_days,
        }
    }

    pub fn exit_params(&self, mode: BreakoutMode, num_days_exit: usize) -> ExitParams {
        ExitParams {
            mode,
            num_days_exit,
            smoothing_period: self.screen.smoothing_period,
        }
    }
}
