//! Symbol list handling: normalizing the data manager's symbol export and
//! reading the authoritative list of symbols for a run.
//!
//! The symbol list is a header-driven CSV. Only two columns carry dates
//! (`Date from`, `Date to`) in `DD.MM.YYYY` form; those get their dots turned
//! into dashes. Every other column is passed through untouched.

use super::files::{safe_delete, write_staged};
use crate::domain::Symbol;
use crate::error::PipelineError;
use std::path::Path;
use tracing::{debug, error, info};

pub const SYMBOL_COLUMN: &str = "Symbol";
pub const DATE_COLUMNS: [&str; 2] = ["Date from", "Date to"];

/// `DD.MM.YYYY` → `DD-MM-YYYY`. Pure character substitution, no calendar
/// validation.
pub fn dots_to_dashes(value: &str) -> String {
    value.replace('.', "-")
}

/// Convert a raw symbol list into its normalized form.
///
/// The source file is consumed: it is removed after the attempt whether the
/// conversion succeeded or not.
pub fn convert_symbol_list(source: &Path, destination: &Path) -> bool {
    debug!(
        "convert symbol list at '{}' and save as '{}'",
        source.display(),
        destination.display()
    );

    let result = try_convert_symbol_list(source, destination);

    if let Err(e) = safe_delete(source) {
        error!("could not remove symbol list source '{}': {e}", source.display());
    }

    match result {
        Ok(rows) => {
            info!("symbol list converted: {rows} symbols → '{}'", destination.display());
            true
        }
        Err(e) => {
            error!(
                kind = e.kind(),
                "symbol list conversion of '{}' failed: {e}",
                source.display()
            );
            false
        }
    }
}

/// Fallible core of [`convert_symbol_list`]. Does not touch the source file.
/// Returns the number of data rows written.
pub fn try_convert_symbol_list(source: &Path, destination: &Path) -> Result<usize, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .from_path(source)?;
    let headers = reader.headers()?.clone();
    let date_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| DATE_COLUMNS.contains(name))
        .map(|(i, _)| i)
        .collect();

    write_staged(destination, |writer| {
        writer.write_record(&headers)?;

        let mut rows = 0;
        let mut out = csv::StringRecord::with_capacity(256, headers.len());
        for record in reader.records() {
            let record = record?;
            out.clear();
            for (i, field) in record.iter().enumerate() {
                if date_columns.contains(&i) {
                    out.push_field(&dots_to_dashes(field));
                } else {
                    out.push_field(field);
                }
            }
            writer.write_record(&out)?;
            rows += 1;
        }
        Ok(rows)
    })
}

/// Read the `Symbol` column of a symbol list, in file order.
///
/// Any failure is logged and yields an empty list, so "no symbols" and
/// "could not read" look the same here. Use [`try_get_symbols_list`] when the
/// difference matters.
pub fn get_symbols_list(source: &Path) -> Vec<Symbol> {
    match try_get_symbols_list(source) {
        Ok(symbols) => symbols,
        Err(e) => {
            error!(
                kind = e.kind(),
                "could not read symbol list '{}': {e}",
                source.display()
            );
            Vec::new()
        }
    }
}

pub fn try_get_symbols_list(source: &Path) -> Result<Vec<Symbol>, PipelineError> {
    debug!("read symbol list at '{}'", source.display());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .from_path(source)?;
    let column = reader
        .headers()?
        .iter()
        .position(|h| h == SYMBOL_COLUMN)
        .ok_or_else(|| {
            PipelineError::Parse(format!(
                "column '{SYMBOL_COLUMN}' not found in '{}'",
                source.display()
            ))
        })?;

    let mut symbols = Vec::new();
    for record in reader.records() {
        let record = record?;
        let symbol = record.get(column).unwrap_or_default();
        debug!("Symbol='{symbol}'");
        symbols.push(symbol.to_string());
    }
    Ok(symbols)
}
