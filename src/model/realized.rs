//! Close-to-close estimators
//!
//! Realized volatility at t is the sample standard deviation of the `window`
//! log returns ending at t. The return at index 0 never exists, so the first
//! defined window holds `window - 1` returns. Hodges-Tompkins rescales it for
//! overlapping-sample bias: adj = 1 / (1 - h/n + (h^2 - 1) / (3n^2)), with h
//! the window and n the number of overlapping windows available at t, i.e.
//! valid returns seen so far minus h plus one.

use super::rolling::{cumulative_count, log_returns, rolling_from, sample_std};
use super::{Estimator, EstimatorParams, VolatilityKind};
use crate::series::PriceSeries;

/// Close-to-close realized volatility
pub struct RealizedVol;

impl Estimator for RealizedVol {
    fn kind(&self) -> VolatilityKind {
        VolatilityKind::Realized
    }

    fn estimate(&self, series: &PriceSeries, params: &EstimatorParams) -> Vec<Option<f64>> {
        let returns = log_returns(series.closes());
        let scale = params.scale();
        rolling_from(&returns, 1, params.window(), |r| {
            sample_std(r).map(|sd| sd * scale)
        })
    }
}

/// Hodges-Tompkins bias-corrected realized volatility
pub struct HodgesTompkinsVol;

impl HodgesTompkinsVol {
    /// Correction factor for window `h` after `returns` valid log returns.
    ///
    /// `None` until a full window of returns has been seen.
    pub fn adjustment(h: usize, returns: usize) -> Option<f64> {
        let n = returns as f64 - h as f64 + 1.0;
        if n <= 0.0 {
            return None;
        }
        let h = h as f64;
        let denom = 1.0 - h / n + (h * h - 1.0) / (3.0 * n * n);
        // Positive except at h = 2, n = 1, where it touches zero
        (denom > 0.0).then(|| 1.0 / denom)
    }
}

impl Estimator for HodgesTompkinsVol {
    fn kind(&self) -> VolatilityKind {
        VolatilityKind::HodgesTompkins
    }

    fn estimate(&self, series: &PriceSeries, params: &EstimatorParams) -> Vec<Option<f64>> {
        let seen = cumulative_count(&log_returns(series.closes()));

        RealizedVol
            .estimate(series, params)
            .into_iter()
            .zip(seen)
            .map(|(v, count)| Some(v? * Self::adjustment(params.window(), count)?))
            .collect()
    }
}
