//! Analysis pipeline types

use crate::error::VolError;
use crate::model::{VolatilityKind, VolatilityResult};
use crate::signal::SpikeAnnotation;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Per-ticker analysis failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Requested ticker absent from the fetch response
    #[error("No data returned for {0}")]
    MissingTicker(String),
    /// Series validation or estimation failed
    #[error("{symbol}: {source}")]
    Volatility {
        symbol: String,
        #[source]
        source: VolError,
    },
}

impl AnalysisError {
    pub fn symbol(&self) -> &str {
        match self {
            AnalysisError::MissingTicker(symbol) => symbol,
            AnalysisError::Volatility { symbol, .. } => symbol,
        }
    }
}

/// Everything computed for one ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerReport {
    pub symbol: String,
    /// Normalized closes, aligned with `result.dates()`
    pub closes: Vec<Option<f64>>,
    pub result: VolatilityResult,
    /// Spikes found in the configured source series, largest first
    pub spikes: Vec<SpikeAnnotation>,
    /// Bars kept despite open/close outside the high-low range
    pub flagged: Vec<NaiveDate>,
}

impl TickerReport {
    /// Latest defined value of each computed series
    pub fn latest(&self) -> Vec<(VolatilityKind, Option<(NaiveDate, f64)>)> {
        self.result
            .kinds()
            .map(|kind| (kind, self.result.series(kind).and_then(|s| s.latest())))
            .collect()
    }
}
