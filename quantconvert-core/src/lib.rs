//! quantconvert core: domain types, file utilities and record converters.
//!
//! This crate holds everything that does not need to talk to the external
//! data manager:
//! - Timeframes and per-symbol export requests with their file naming
//! - File helpers (safe delete, chunked line counting, temp paths)
//! - Streaming converters for symbol lists and quote exports
//! - The closed `PipelineError` enumeration shared with the runner

pub mod data;
pub mod domain;
pub mod error;

pub use error::PipelineError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: public types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Timeframe>();
        require_sync::<domain::Timeframe>();
        require_send::<domain::DataRequest>();
        require_sync::<domain::DataRequest>();
        require_send::<PipelineError>();
        require_sync::<PipelineError>();
    }
}
