//! Symbol lists and open-position books.
//!
//! A symbol list is either a JSON array of tickers or a TOML file with a
//! `symbols = [...]` key. Tickers are upper-cased and deduplicated, keeping
//! first-seen order. The position book is TOML:
//!
//! ```toml
//! [[positions]]
//! timeframe = 20
//! mode = "max"
//! symbols = ["APPF", "VCSH"]
//! ```

use crate::domain::BreakoutMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },
}

fn read(path: &Path) -> Result<String, UniverseError> {
    std::fs::read_to_string(path).map_err(|source| UniverseError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn normalize(symbols: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Tickers to screen, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolList {
    pub symbols: Vec<String>,
}

impl SymbolList {
    pub fn new(symbols: impl IntoIterator<Item = String>) -> Self {
        Self {
            symbols: normalize(symbols),
        }
    }

    /// Load by extension: `.toml` as TOML, anything else as a JSON array.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = read(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, UniverseError> {
        let symbols: Vec<String> =
            serde_json::from_str(content).map_err(|e| UniverseError::Parse {
                what: "symbol list JSON",
                reason: e.to_string(),
            })?;
        Ok(Self::new(symbols))
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let list: SymbolList = toml::from_str(content).map_err(|e| UniverseError::Parse {
            what: "symbol list TOML",
            reason: e.to_string(),
        })?;
        Ok(Self::new(list.symbols))
    }

    pub fn as_strs(&self) -> Vec<&str> {
        self.symbols.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Open positions sharing an exit timeframe and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionGroup {
    /// Exit lookback in trading days.
    pub timeframe: usize,
    pub mode: BreakoutMode,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBook {
    #[serde(default)]
    pub positions: Vec<PositionGroup>,
}

impl PositionBook {
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        Self::from_toml(&read(path)?)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        let mut book: PositionBook = toml::from_str(content).map_err(|e| UniverseError::Parse {
            what: "positions TOML",
            reason: e.to_string(),
        })?;
        for group in &mut book.positions {
            group.symbols = normalize(std::mem::take(&mut group.symbols));
        }
        Ok(book)
    }

    pub fn symbol_count(&self) -> usize {
        self.positions.iter().map(|g| g.symbols.len()).sum()
    }
}
