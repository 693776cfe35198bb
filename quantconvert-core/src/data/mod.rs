//! File handling and CSV conversion for data manager exports.
//!
//! - `files`: delete-if-exists, newline counting, temp-path reservation
//! - `symbols`: symbol-list normalization and symbol reading
//! - `quotes`: raw quote export → canonical OHLCV CSV

pub mod files;
pub mod quotes;
pub mod symbols;

pub use files::{count_lines, safe_delete, staging_path, temp_path};
pub use quotes::{convert_quotes, try_convert_quotes, CanonicalQuote, QUOTE_HEADER};
pub use symbols::{
    convert_symbol_list, get_symbols_list, try_convert_symbol_list, try_get_symbols_list,
    SYMBOL_COLUMN,
};
