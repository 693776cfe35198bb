//! Domain types for quote exports

pub mod request;
pub mod timeframe;

pub use request::{DataRequest, RAW_EXPORT_SUFFIX};
pub use timeframe::{ParseTimeframeError, Timeframe};

/// Symbol type alias
pub type Symbol = String;
