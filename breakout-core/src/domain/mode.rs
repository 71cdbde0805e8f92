//! Breakout mode: which extreme a breakout is measured against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// `Max` detects a new high (long orientation), `Min` a new low (short orientation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakoutMode {
    Max,
    Min,
}

/// A mode string that is neither `max` nor `min`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("must specify either max or min, got '{0}'")]
pub struct InvalidMode(pub String);

impl BreakoutMode {
    pub const ALL: [BreakoutMode; 2] = [BreakoutMode::Max, BreakoutMode::Min];

    /// Mode of the exit signal for a position opened in this mode.
    pub fn opposite(self) -> Self {
        match self {
            BreakoutMode::Max => BreakoutMode::Min,
            BreakoutMode::Min => BreakoutMode::Max,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BreakoutMode::Max => "max",
            BreakoutMode::Min => "min",
        }
    }

    /// "long" for `Max`, "short" for `Min`.
    pub fn position_label(self) -> &'static str {
        match self {
            BreakoutMode::Max => "long",
            BreakoutMode::Min => "short",
        }
    }
}

impl fmt::Display for BreakoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakoutMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            m if m.eq_ignore_ascii_case("max") => Ok(BreakoutMode::Max),
            m if m.eq_ignore_ascii_case("min") => Ok(BreakoutMode::Min),
            other => Err(InvalidMode(other.to_string())),
        }
    }
}
