//! Log setup: console on stdout plus a daily-rotated file under `log/`.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const LOG_DIR: &str = "log";

/// Files are named `log.<YYYY-MM-DD>.txt`.
const LOG_FILE_PREFIX: &str = "log";
const LOG_FILE_SUFFIX: &str = "txt";

/// Rotated files kept on disk, the current one included.
const LOG_FILES_KEPT: usize = 6;

const TIME_FORMAT: &str = "%H:%M:%S";

/// Daily-rotating appender in `log_dir`. Old files beyond
/// `LOG_FILES_KEPT` are pruned on rotation.
pub fn file_appender(log_dir: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(LOG_FILES_KEPT)
        .build(log_dir)
        .with_context(|| format!("cannot open log files in '{}'", log_dir.display()))
}

/// Install the global subscriber.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` is honored and falls back
/// to `info`.
pub fn init_logging(log_dir: &Path, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        EnvFilter::try_new("debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?
    };

    let console_layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(false)
        .with_writer(std::io::stdout);

    let file_layer = fmt::layer()
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(false)
        .with_writer(file_appender(log_dir)?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn appender_creates_dated_file_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("log");

        let mut appender = file_appender(&log_dir).unwrap();
        writeln!(appender, "12:00:00  INFO --- START 'quantconvert' ---").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = fs::read_dir(&log_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1, "{names:?}");
        assert!(names[0].starts_with("log.") && names[0].ends_with(".txt"), "{names:?}");

        let content = fs::read_to_string(log_dir.join(&names[0])).unwrap();
        assert!(content.contains("START"));
    }
}
