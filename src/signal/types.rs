//! Spike annotation types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A statistically extreme volatility reading, placed for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeAnnotation {
    /// Date of the reading
    pub date: NaiveDate,
    /// Volatility value at that date
    pub magnitude: f64,
    /// Standard deviations above the series mean
    pub z_score: f64,
    /// Display text
    pub label: String,
    /// Vertical label position, never above `magnitude`
    pub y_position: f64,
}

impl SpikeAnnotation {
    pub fn format_label(magnitude: f64, z_score: f64) -> String {
        format!("Spike: {:.2} ({:.1}σ)", magnitude, z_score)
    }
}
