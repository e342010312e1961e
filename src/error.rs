//! Error taxonomy for the estimation core

use chrono::NaiveDate;
use thiserror::Error;

/// Input-validation failures raised by the price series and the engine.
///
/// All variants are fatal to the request that produced them and never to the
/// process: nothing is retried or partially computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VolError {
    /// No bars left after normalization
    #[error("No price data after normalization")]
    EmptyData,
    /// A bar that cannot be trusted even after filling
    #[error("Malformed bar on {date}: {reason}")]
    MalformedBar { date: NaiveDate, reason: String },
    /// Window shorter than two bars
    #[error("Invalid window {0}: must be at least 2")]
    InvalidWindow(usize),
    /// Fewer complete bars than the window needs
    #[error("Insufficient data: window needs {required} bars, only {available} valid")]
    InsufficientData { required: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, VolError>;
