//! Range-based estimators
//!
//! Parkinson: p = ln(H/L)^2 / (4 ln 2)
//! Garman-Klass: g = 0.5 ln(H/L)^2 - (2 ln 2 - 1) ln(C/O)^2
//!
//! Both report scale * sqrt(mean over the window).

use super::rolling::{mean, rolling};
use super::{Estimator, EstimatorParams, VolatilityKind};
use crate::series::PriceSeries;
use std::f64::consts::LN_2;

/// Parkinson high/low estimator
pub struct ParkinsonVol;

impl ParkinsonVol {
    fn term(high: Option<f64>, low: Option<f64>) -> Option<f64> {
        let hl = (high? / low?).ln();
        Some(hl * hl / (4.0 * LN_2))
    }
}

impl Estimator for ParkinsonVol {
    fn kind(&self) -> VolatilityKind {
        VolatilityKind::Parkinson
    }

    fn estimate(&self, series: &PriceSeries, params: &EstimatorParams) -> Vec<Option<f64>> {
        let terms: Vec<Option<f64>> = series
            .highs()
            .iter()
            .zip(series.lows())
            .map(|(&h, &l)| Self::term(h, l))
            .collect();

        let scale = params.scale();
        rolling(&terms, params.window(), |p| {
            mean(p).map(|m| scale * m.sqrt())
        })
    }
}

/// Garman-Klass open/high/low/close estimator
pub struct GarmanKlassVol;

impl GarmanKlassVol {
    fn term(open: Option<f64>, high: Option<f64>, low: Option<f64>, close: Option<f64>) -> Option<f64> {
        let hl = (high? / low?).ln();
        let co = (close? / open?).ln();
        Some(0.5 * hl * hl - (2.0 * LN_2 - 1.0) * co * co)
    }
}

impl Estimator for GarmanKlassVol {
    fn kind(&self) -> VolatilityKind {
        VolatilityKind::GarmanKlass
    }

    fn estimate(&self, series: &PriceSeries, params: &EstimatorParams) -> Vec<Option<f64>> {
        let terms: Vec<Option<f64>> = (0..series.len())
            .map(|i| {
                Self::term(
                    series.opens()[i],
                    series.highs()[i],
                    series.lows()[i],
                    series.closes()[i],
                )
            })
            .collect();

        let scale = params.scale();
        // Only bars with open/close outside the range can drive the mean negative
        rolling(&terms, params.window(), |g| {
            mean(g).filter(|m| *m >= 0.0).map(|m| scale * m.sqrt())
        })
    }
}
