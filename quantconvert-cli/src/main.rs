//! QuantConvert CLI: export quotes from QuantDataManager and convert them.
//!
//! Commands:
//! - `export`: export every listed symbol and convert it to canonical CSV
//! - `symbols`: refresh the symbol list from the data manager
//! - `quotes`: let the data manager update its quote database
//! - `all`: symbols, quotes, then export

mod logging;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use quantconvert_core::domain::Timeframe;
use quantconvert_runner::config::DEFAULT_CONFIG_FILE;
use quantconvert_runner::{
    Config, ConfigError, LogProgress, Pipeline, PipelineConfig, ProcessRunner,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

const APP_NAME: &str = "quantconvert";

#[derive(Parser)]
#[command(
    name = "quantconvert",
    about = "Export quotes from QuantDataManager and convert them to canonical CSV"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every symbol in the symbol list and convert the results.
    Export {
        /// Timeframe (M1, M5, M15, M30, H1, H4, D1). Defaults to the config value.
        #[arg(long)]
        timeframe: Option<Timeframe>,
    },
    /// Refresh the symbol list from the data manager.
    Symbols,
    /// Update the quote database inside the data manager.
    Quotes,
    /// Refresh symbols, update quotes, then export.
    All {
        /// Timeframe (M1, M5, M15, M30, H1, H4, D1). Defaults to the config value.
        #[arg(long)]
        timeframe: Option<Timeframe>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(Path::new(logging::LOG_DIR), cli.verbose)?;

    info!(
        "--- START '{APP_NAME}' on {} ---",
        Local::now().format("%Y-%b-%d")
    );

    let pipeline_config = match load_config(&cli.config) {
        Ok(pc) => pc,
        Err(e) => {
            error!(severity = "critical", "configuration error: {e}");
            return Err(e);
        }
    };

    let runner = ProcessRunner::new();
    let progress = LogProgress;
    let pipeline = Pipeline::new(&pipeline_config, &runner, &progress);

    let ok = match cli.command {
        Commands::Export { timeframe } => {
            run_export(&pipeline, timeframe.unwrap_or(pipeline_config.timeframe))?
        }
        Commands::Symbols => run_symbols(&pipeline)?,
        Commands::Quotes => run_quotes(&pipeline)?,
        Commands::All { timeframe } => {
            run_symbols(&pipeline)?
                && run_quotes(&pipeline)?
                && run_export(&pipeline, timeframe.unwrap_or(pipeline_config.timeframe))?
        }
    };

    if !ok {
        std::process::exit(1);
    }

    info!("--- END '{APP_NAME}' ---");
    Ok(())
}

fn load_config(path: &Path) -> Result<PipelineConfig> {
    let base_dir = std::env::current_dir().context("cannot determine working directory")?;
    let config = Config::from_file(path)?;
    info!("configuration read from '{}'", config.origin());
    Ok(PipelineConfig::from_config(config, &base_dir)?)
}

fn run_symbols(pipeline: &Pipeline<'_>) -> Result<bool> {
    info!("--- STEP 1 of 3: updating list of symbols ---");
    let ok = step(pipeline.update_symbols_list())?;
    if !ok {
        error!(severity = "critical", "update of symbols list failed");
    }
    Ok(ok)
}

fn run_quotes(pipeline: &Pipeline<'_>) -> Result<bool> {
    info!("--- STEP 2 of 3: updating quotes ---");
    let ok = step(pipeline.update_quotes())?;
    if !ok {
        error!(severity = "critical", "update of quotes failed");
    }
    Ok(ok)
}

fn run_export(pipeline: &Pipeline<'_>, timeframe: Timeframe) -> Result<bool> {
    info!("--- STEP 3 of 3: exporting to csv ({timeframe}) ---");
    let summary = step(pipeline.export_quotes(timeframe))?;

    if summary.all_succeeded() {
        return Ok(true);
    }
    for symbol in summary.failed_symbols() {
        error!("export failed for {symbol}");
    }
    error!(severity = "critical", "export to CSV failed");
    Ok(false)
}

/// A missing script or similar setup problem is fatal for the whole run.
fn step<T>(result: Result<T, ConfigError>) -> Result<T> {
    result.map_err(|e| {
        error!(severity = "critical", "configuration error: {e}");
        e.into()
    })
}
