//! Timeframe: sampling granularity of exported quote bars.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bar granularity understood by the data manager.
///
/// Always rendered upper-cased (`M1`, `H4`, ...) because the external program
/// and the export file names expect that spelling. Deserializes through
/// [`FromStr`], so config files may use any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Timeframe {
    #[default]
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown timeframe '{0}' (valid: M1, M5, M15, M30, H1, H4, D1)")]
pub struct ParseTimeframeError(pub String);

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == upper)
            .ok_or_else(|| ParseTimeframeError(s.to_string()))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = ParseTimeframeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
