//! QuantConvert Runner: configuration, external process calls, and the
//! export orchestrator.
//!
//! This crate builds on `quantconvert-core` to provide:
//! - TOML configuration with section/option lookup and path resolution
//! - Launching the data manager's invocation scripts without a shell
//! - The per-symbol export → convert loop with a batch summary
//! - Symbol list refresh and quote update maintenance steps

pub mod config;
pub mod export;
pub mod process;

pub use config::{Config, ConfigError, ExportSection, PipelineConfig};
pub use export::{ExportProgress, ExportSummary, LogProgress, Pipeline, SymbolOutcome};
pub use process::{CommandLine, CommandRunner, ProcessRunner};
