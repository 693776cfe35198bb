//! DataRequest: one (symbol, timeframe) export job and its file names.

use super::timeframe::Timeframe;
use std::path::{Path, PathBuf};

/// Suffix the data manager appends to every quote export. Part of the
/// external contract; must match byte for byte.
pub const RAW_EXPORT_SUFFIX: &str = "-No Session.csv";

/// A single export job handed to the data manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRequest {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub destination_dir: PathBuf,
}

impl DataRequest {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        destination_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            destination_dir: destination_dir.into(),
        }
    }

    /// `{symbol}-{TF}-No Session.csv`
    pub fn raw_file_name(&self) -> String {
        format!("{}-{}{RAW_EXPORT_SUFFIX}", self.symbol, self.timeframe)
    }

    /// `{symbol}-{TF}.csv`
    pub fn canonical_file_name(&self) -> String {
        format!("{}-{}.csv", self.symbol, self.timeframe)
    }

    /// Where the data manager writes its export for this request.
    pub fn raw_path(&self) -> PathBuf {
        self.destination_dir.join(self.raw_file_name())
    }

    /// Where the converted file ends up.
    pub fn canonical_path(&self) -> PathBuf {
        self.destination_dir.join(self.canonical_file_name())
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_export_convention() {
        let req = DataRequest::new("EURUSD", Timeframe::M1, "/data");
        assert_eq!(req.raw_file_name(), "EURUSD-M1-No Session.csv");
        assert_eq!(req.canonical_file_name(), "EURUSD-M1.csv");
        assert_eq!(req.raw_path(), Path::new("/data/EURUSD-M1-No Session.csv"));
        assert_eq!(req.canonical_path(), Path::new("/data/EURUSD-M1.csv"));
    }

    #[test]
    fn timeframe_is_upper_cased_in_names() {
        let tf: Timeframe = "h1".parse().unwrap();
        let req = DataRequest::new("SPY", tf, "out");
        assert_eq!(req.canonical_file_name(), "SPY-H1.csv");
    }
}
