//! Quote conversion: data manager export → canonical OHLCV CSV.
//!
//! Input is headerless and positional:
//! `date(DD.MM.YYYY), time(HH:MM), open, high, low, close, volume`.
//! Output has the header `date,open,high,low,close,volume` where `date` is
//! `YYYY-MM-DDTHH:MMZ`. Prices and volume are copied as text so no precision
//! is lost. Rows keep their input order.

use super::files::{count_lines, safe_delete, write_staged};
use super::symbols::dots_to_dashes;
use crate::error::PipelineError;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, error, info};

pub const QUOTE_HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Minimum number of columns in a raw export row.
pub const RAW_QUOTE_COLUMNS: usize = 7;

/// One output row. Borrows the numeric fields from the raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalQuote<'a> {
    pub date: String,
    pub open: &'a str,
    pub high: &'a str,
    pub low: &'a str,
    pub close: &'a str,
    pub volume: &'a str,
}

impl<'a> CanonicalQuote<'a> {
    /// Map a raw export row. Returns `None` when the row has fewer than
    /// [`RAW_QUOTE_COLUMNS`] fields; trailing extras are ignored.
    pub fn from_raw(record: &'a csv::StringRecord) -> Option<Self> {
        if record.len() < RAW_QUOTE_COLUMNS {
            return None;
        }
        Some(Self {
            date: iso_timestamp(&record[0], &record[1]),
            open: &record[2],
            high: &record[3],
            low: &record[4],
            close: &record[5],
            volume: &record[6],
        })
    }

    pub fn fields(&self) -> [&str; 6] {
        [
            self.date.as_str(),
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        ]
    }
}

/// `01.03.2021`, `13:45` → `2021-03-01T13:45Z`.
pub fn iso_timestamp(date: &str, time: &str) -> String {
    format!("{}T{time}Z", iso_date(date))
}

/// Day-first `D.M.YYYY` becomes `YYYY-MM-DD`, with day and month padded to
/// two digits. Anything else (already year-first, or not date-shaped at all)
/// only gets its dots replaced with dashes. No calendar validation either way.
pub fn iso_date(date: &str) -> String {
    let mut parts = date.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(day), Some(month), Some(year), None)
            if is_day_or_month(day) && is_day_or_month(month) && is_year(year) =>
        {
            format!("{year}-{month:0>2}-{day:0>2}")
        }
        _ => dots_to_dashes(date),
    }
}

fn is_day_or_month(part: &str) -> bool {
    (1..=2).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
}

fn is_year(part: &str) -> bool {
    part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit())
}

/// Convert one raw quote export into the canonical layout.
///
/// Any pre-existing destination is deleted first. The source file is consumed
/// after the attempt, successful or not; the destination only appears once
/// every row has been written.
pub fn convert_quotes(source: &Path, destination: &Path) -> bool {
    debug!(
        "convert quotes from '{}' and save as '{}'",
        source.display(),
        destination.display()
    );

    let result = try_convert_quotes(source, destination);

    if let Err(e) = safe_delete(source) {
        error!("could not remove quote source '{}': {e}", source.display());
    }

    match result {
        Ok(rows) => {
            info!("{rows} quotes written to '{}'", destination.display());
            true
        }
        Err(e) => {
            error!(
                kind = e.kind(),
                "quote conversion of '{}' failed: {e}",
                source.display()
            );
            false
        }
    }
}

/// Fallible core of [`convert_quotes`]. Does not touch the source file.
/// Returns the number of rows written.
pub fn try_convert_quotes(source: &Path, destination: &Path) -> Result<usize, PipelineError> {
    safe_delete(destination)?;

    // Line count only sizes the progress bar; it never affects the output.
    let total = count_lines(source)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b',')
        .quote(b'"')
        .from_path(source)?;

    let progress = quote_progress(total, source);
    let result = write_staged(destination, |writer| {
        writer.write_record(QUOTE_HEADER)?;

        let mut rows = 0;
        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            let quote = CanonicalQuote::from_raw(&record).ok_or_else(|| {
                PipelineError::Parse(format!(
                    "line {}: expected {RAW_QUOTE_COLUMNS} columns, found {}",
                    record.position().map_or(0, |p| p.line()),
                    record.len()
                ))
            })?;
            writer.write_record(quote.fields())?;
            rows += 1;
            progress.inc(1);
        }
        Ok(rows)
    });

    match result {
        Ok(_) => progress.finish(),
        Err(_) => progress.abandon(),
    }
    result
}

fn quote_progress(total: u64, source: &Path) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    if let Some(name) = source.file_name() {
        pb.set_message(name.to_string_lossy().into_owned());
    }
    pb
}
