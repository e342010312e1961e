//! Volatility model module
//!
//! Rolling annualized volatility estimators over a [`PriceSeries`]

mod engine;
mod range;
mod realized;
mod rolling;
mod types;

pub use engine::{VolatilityEngine, TRADING_DAYS_PER_YEAR};
pub use range::{GarmanKlassVol, ParkinsonVol};
pub use realized::{HodgesTompkinsVol, RealizedVol};
pub use types::{VolPoint, VolatilityKind, VolatilityResult, VolatilitySeries};

pub(crate) use rolling::{mean, sample_std};

use crate::error::{Result, VolError};
use crate::series::PriceSeries;

/// Parameters shared by every estimator in one calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorParams {
    window: usize,
    scale: f64,
}

impl EstimatorParams {
    /// `scale` multiplies every per-period volatility (`sqrt(T)` or 1)
    pub fn new(window: usize, scale: f64) -> Result<Self> {
        if window < 2 {
            return Err(VolError::InvalidWindow(window));
        }
        Ok(Self { window, scale })
    }

    /// Window length in bars
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Trait for rolling volatility estimators.
///
/// Output is aligned with the series' dates; the first `window - 1` entries
/// are always `None`.
pub trait Estimator: Send + Sync {
    /// Which column this estimator produces
    fn kind(&self) -> VolatilityKind;
    /// Estimate over every trailing window of the series
    fn estimate(&self, series: &PriceSeries, params: &EstimatorParams) -> Vec<Option<f64>>;
}

/// Estimator implementation for a kind
pub fn estimator_for(kind: VolatilityKind) -> &'static dyn Estimator {
    match kind {
        VolatilityKind::Realized => &RealizedVol,
        VolatilityKind::Parkinson => &ParkinsonVol,
        VolatilityKind::GarmanKlass => &GarmanKlassVol,
        VolatilityKind::HodgesTompkins => &HodgesTompkinsVol,
    }
}
