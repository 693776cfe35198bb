//! Export orchestrator. Drives the data manager once per symbol and converts
//! each export into the canonical quote layout.
//!
//! A run walks the symbol list in order. For every symbol:
//! 1. call the export script: `<script> <dataManager> <symbol> <TF> <dataDir>`
//! 2. if that worked, convert `{symbol}-{TF}-No Session.csv` → `{symbol}-{TF}.csv`
//! 3. record the outcome and move on
//!
//! A failing symbol never stops the batch. There are no retries and no
//! rollback. The two maintenance steps (refreshing the symbol list and
//! updating quotes inside the data manager) live here as well since they go
//! through the same runner.

use quantconvert_core::data::files::{safe_delete, temp_path};
use quantconvert_core::data::quotes::convert_quotes;
use quantconvert_core::data::symbols::{convert_symbol_list, try_get_symbols_list};
use quantconvert_core::domain::{DataRequest, Timeframe};
use tracing::{error, info, warn};

use crate::config::{
    ConfigError, PipelineConfig, SCRIPT_EXPORT_QUOTES, SCRIPT_GET_SYMBOLS, SCRIPT_UPDATE_QUOTES,
};
use crate::process::{CommandLine, CommandRunner};

/// What happened to one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOutcome {
    /// Exported and converted.
    Converted,
    /// The data manager call failed; conversion was not attempted.
    ExportFailed,
    /// The export worked but conversion did not.
    ConvertFailed,
}

impl SymbolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SymbolOutcome::Converted)
    }
}

/// Progress callback for multi-symbol exports.
pub trait ExportProgress {
    /// Called before a symbol's export starts.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called once a symbol's outcome is final.
    fn on_complete(&self, symbol: &str, index: usize, total: usize, outcome: SymbolOutcome);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Reports progress through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ExportProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        info!("[{}/{}] exporting {symbol}", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, _index: usize, _total: usize, outcome: SymbolOutcome) {
        match outcome {
            SymbolOutcome::Converted => info!("  OK: {symbol}"),
            SymbolOutcome::ExportFailed => warn!("  FAIL: {symbol}: export failed"),
            SymbolOutcome::ConvertFailed => warn!("  FAIL: {symbol}: conversion failed"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        info!("export complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Per-symbol outcomes of one export run, in list order.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub timeframe: Timeframe,
    pub outcomes: Vec<(String, SymbolOutcome)>,
}

impl ExportSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Logical AND over every symbol. An empty run is vacuously successful.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| o.is_success())
    }

    /// Symbols whose export or conversion failed.
    pub fn failed_symbols(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_success())
            .map(|(s, _)| s.as_str())
    }
}

/// The pipeline, wired to its collaborators.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    runner: &'a dyn CommandRunner,
    progress: &'a dyn ExportProgress,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        runner: &'a dyn CommandRunner,
        progress: &'a dyn ExportProgress,
    ) -> Self {
        Self {
            config,
            runner,
            progress,
        }
    }

    /// Export and convert quotes for every symbol in the symbol list.
    ///
    /// Only configuration problems are returned as errors; everything that
    /// goes wrong per symbol ends up in the summary.
    pub fn export_quotes(&self, timeframe: Timeframe) -> Result<ExportSummary, ConfigError> {
        let script = self.config.script_path(SCRIPT_EXPORT_QUOTES)?;

        let symbols = match try_get_symbols_list(&self.config.symbol_list) {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(
                    kind = e.kind(),
                    "could not read symbol list '{}': {e}",
                    self.config.symbol_list.display()
                );
                Vec::new()
            }
        };
        if symbols.is_empty() {
            warn!(
                "no symbols in '{}', nothing to export",
                self.config.symbol_list.display()
            );
        }

        let requests: Vec<DataRequest> = symbols
            .into_iter()
            .map(|symbol| DataRequest::new(symbol, timeframe, &self.config.data_dir))
            .collect();

        Ok(self.export_requests(&script, timeframe, &requests))
    }

    /// Export a prepared batch of requests with the given export script.
    pub fn export_requests(
        &self,
        script: &std::path::Path,
        timeframe: Timeframe,
        requests: &[DataRequest],
    ) -> ExportSummary {
        let total = requests.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, request) in requests.iter().enumerate() {
            self.progress.on_start(&request.symbol, i, total);
            let outcome = self.export_single(script, request);
            self.progress.on_complete(&request.symbol, i, total, outcome);
            outcomes.push((request.symbol.clone(), outcome));
        }

        let summary = ExportSummary {
            timeframe,
            outcomes,
        };
        self.progress
            .on_batch_complete(summary.succeeded(), summary.failed(), total);
        summary
    }

    /// Export one symbol: run the data manager → convert its output.
    fn export_single(&self, script: &std::path::Path, request: &DataRequest) -> SymbolOutcome {
        let command = CommandLine::new(script)
            .arg(&self.config.data_manager)
            .arg(&request.symbol)
            .arg(request.timeframe.as_str())
            .arg(request.destination_dir());

        if !self.runner.run(&command) {
            return SymbolOutcome::ExportFailed;
        }

        if convert_quotes(&request.raw_path(), &request.canonical_path()) {
            SymbolOutcome::Converted
        } else {
            SymbolOutcome::ConvertFailed
        }
    }

    /// Ask the data manager for a fresh symbol list and normalize it into the
    /// configured symbol list file.
    ///
    /// The previous list is removed first so a failed update never leaves a
    /// stale list looking current.
    pub fn update_symbols_list(&self) -> Result<bool, ConfigError> {
        let script = self.config.script_path(SCRIPT_GET_SYMBOLS)?;

        if let Err(e) = safe_delete(&self.config.symbol_list) {
            error!(
                "could not remove old symbol list '{}': {e}",
                self.config.symbol_list.display()
            );
            return Ok(false);
        }

        let raw = temp_path();
        let command = CommandLine::new(script)
            .arg(&self.config.data_manager)
            .arg(&raw);

        if !self.runner.run(&command) {
            if let Err(e) = safe_delete(&raw) {
                warn!("could not remove '{}': {e}", raw.display());
            }
            return Ok(false);
        }

        Ok(convert_symbol_list(&raw, &self.config.symbol_list))
    }

    /// Let the data manager update its quote database.
    pub fn update_quotes(&self) -> Result<bool, ConfigError> {
        let script = self.config.script_path(SCRIPT_UPDATE_QUOTES)?;
        let command = CommandLine::new(script).arg(&self.config.data_manager);
        Ok(self.runner.run(&command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_is_vacuously_successful() {
        let summary = ExportSummary::default();
        assert!(summary.all_succeeded());
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.failed(), 0);
    }

    #[test]
    fn any_failure_fails_the_batch() {
        let summary = ExportSummary {
            timeframe: Timeframe::M1,
            outcomes: vec![
                ("EURUSD".into(), SymbolOutcome::Converted),
                ("GBPUSD".into(), SymbolOutcome::ConvertFailed),
                ("USDJPY".into(), SymbolOutcome::ExportFailed),
            ],
        };
        assert!(!summary.all_succeeded());
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 2);
        assert_eq!(
            summary.failed_symbols().collect::<Vec<_>>(),
            vec!["GBPUSD", "USDJPY"]
        );
    }

    #[test]
    fn only_converted_counts_as_success() {
        assert!(SymbolOutcome::Converted.is_success());
        assert!(!SymbolOutcome::ExportFailed.is_success());
        assert!(!SymbolOutcome::ConvertFailed.is_success());
    }
}
