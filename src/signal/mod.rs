//! Signal module
//!
//! Flags anomalous volatility readings for annotation

mod spike;
mod types;

pub use spike::{SpikeDetector, DEFAULT_MAX_ANNOTATIONS, DEFAULT_THRESHOLD};
pub use types::SpikeAnnotation;
