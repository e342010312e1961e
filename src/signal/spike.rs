//! Volatility spike detection

use super::SpikeAnnotation;
use crate::config::SpikeConfig;
use crate::model::{mean, sample_std, VolatilitySeries};
use chrono::NaiveDate;

/// Default threshold in standard deviations
pub const DEFAULT_THRESHOLD: f64 = 2.5;
/// Default cap on returned annotations
pub const DEFAULT_MAX_ANNOTATIONS: usize = 10;

/// Shrink factor applied while a label collides with an existing one
const SHRINK: f64 = 0.95;
/// Minimum label separation as a fraction of the series maximum
const MIN_GAP_FRACTION: f64 = 0.1;
/// Labels stop moving after this many shrinks
const MAX_SHRINK_STEPS: usize = 200;

/// Flags readings above `mean + threshold * stdev` and stacks their labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeDetector {
    threshold: f64,
    max_annotations: usize,
}

impl Default for SpikeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SpikeDetector {
    /// Create a detector. Thresholds outside roughly [1, 4] are accepted as
    /// given.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            max_annotations: DEFAULT_MAX_ANNOTATIONS,
        }
    }

    pub fn from_config(config: &SpikeConfig) -> Self {
        Self::new(config.threshold).with_max_annotations(config.max_annotations)
    }

    pub fn with_max_annotations(mut self, max: usize) -> Self {
        self.max_annotations = max;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Detect spikes, largest first.
    ///
    /// Undefined points are ignored. Returns an empty list when fewer than two
    /// points are defined or nothing clears the cutoff.
    pub fn detect(&self, series: &VolatilitySeries) -> Vec<SpikeAnnotation> {
        let values: Vec<(NaiveDate, f64)> = series.defined().collect();
        let magnitudes: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
        let (Some(avg), Some(std)) = (mean(&magnitudes), sample_std(&magnitudes)) else {
            return Vec::new();
        };
        let cutoff = avg + self.threshold * std;

        let mut spikes: Vec<(NaiveDate, f64)> =
            values.iter().copied().filter(|(_, v)| *v > cutoff).collect();
        if spikes.is_empty() {
            return Vec::new();
        }

        // Ties fall back to date order so placement is deterministic
        spikes.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        spikes.truncate(self.max_annotations);

        let series_max = magnitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_gap = MIN_GAP_FRACTION * series_max;

        let mut placed: Vec<f64> = Vec::with_capacity(spikes.len());
        spikes
            .into_iter()
            .map(|(date, magnitude)| {
                let y_position = place_label(magnitude, &placed, min_gap);
                placed.push(y_position);

                let z_score = if std > 0.0 { (magnitude - avg) / std } else { 0.0 };
                SpikeAnnotation {
                    date,
                    magnitude,
                    z_score,
                    label: SpikeAnnotation::format_label(magnitude, z_score),
                    y_position,
                }
            })
            .collect()
    }
}

/// Greedy placement: shrink from `start` until clear of every placed label
fn place_label(start: f64, placed: &[f64], min_gap: f64) -> f64 {
    let mut y = start;
    for _ in 0..MAX_SHRINK_STEPS {
        if !placed.iter().any(|p| (y - p).abs() < min_gap) {
            break;
        }
        y *= SHRINK;
    }
    y
}
