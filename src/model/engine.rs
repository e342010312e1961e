//! Volatility engine
//!
//! Runs the estimators over one price series with a shared window

use super::{estimator_for, EstimatorParams, VolatilityKind, VolatilityResult};
use crate::config::EngineConfig;
use crate::error::{Result, VolError};
use crate::series::PriceSeries;
use std::num::NonZeroU32;

/// Default annualization basis
pub const TRADING_DAYS_PER_YEAR: NonZeroU32 = match NonZeroU32::new(252) {
    Some(days) => days,
    None => unreachable!(),
};

/// Computes annualized rolling volatility for a [`PriceSeries`].
///
/// Stateless: every call owns its input and returns a fresh result, so one
/// engine can serve any number of tickers concurrently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityEngine {
    window: usize,
    annualize: bool,
    trading_days_per_year: NonZeroU32,
}

impl VolatilityEngine {
    /// Create an annualizing engine with a 252-day year
    pub fn new(window: usize) -> Result<Self> {
        if window < 2 {
            return Err(VolError::InvalidWindow(window));
        }
        Ok(Self {
            window,
            annualize: true,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        })
    }

    /// Create from the `[engine]` config section
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(config.window)?
            .annualized(config.annualize)
            .with_trading_days(config.trading_days_per_year))
    }

    /// Toggle sqrt(T) scaling of every estimator
    pub fn annualized(mut self, annualize: bool) -> Self {
        self.annualize = annualize;
        self
    }

    pub fn with_trading_days(mut self, days: NonZeroU32) -> Self {
        self.trading_days_per_year = days;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn is_annualized(&self) -> bool {
        self.annualize
    }

    pub fn trading_days_per_year(&self) -> u32 {
        self.trading_days_per_year.get()
    }

    fn params(&self) -> Result<EstimatorParams> {
        let scale = if self.annualize {
            f64::from(self.trading_days_per_year.get()).sqrt()
        } else {
            1.0
        };
        EstimatorParams::new(self.window, scale)
    }

    fn check(&self, series: &PriceSeries) -> Result<EstimatorParams> {
        let available = series.valid_len();
        if available < self.window {
            return Err(VolError::InsufficientData {
                required: self.window,
                available,
            });
        }
        self.params()
    }

    /// One estimator column, aligned with the series' dates
    pub fn estimate(&self, kind: VolatilityKind, series: &PriceSeries) -> Result<Vec<Option<f64>>> {
        let params = self.check(series)?;
        Ok(estimator_for(kind).estimate(series, &params))
    }

    pub fn realized_vol(&self, series: &PriceSeries) -> Result<Vec<Option<f64>>> {
        self.estimate(VolatilityKind::Realized, series)
    }

    pub fn parkinson_vol(&self, series: &PriceSeries) -> Result<Vec<Option<f64>>> {
        self.estimate(VolatilityKind::Parkinson, series)
    }

    pub fn garman_klass_vol(&self, series: &PriceSeries) -> Result<Vec<Option<f64>>> {
        self.estimate(VolatilityKind::GarmanKlass, series)
    }

    pub fn hodges_tompkins_vol(&self, series: &PriceSeries) -> Result<Vec<Option<f64>>> {
        self.estimate(VolatilityKind::HodgesTompkins, series)
    }

    /// All four estimators over the same window, column-aligned
    pub fn calculate_all(&self, series: &PriceSeries) -> Result<VolatilityResult> {
        self.calculate(series, &VolatilityKind::ALL)
    }

    /// A chosen subset of estimators
    pub fn calculate(&self, series: &PriceSeries, kinds: &[VolatilityKind]) -> Result<VolatilityResult> {
        let params = self.check(series)?;
        let mut result = VolatilityResult::new(series.dates().to_vec());
        for &kind in kinds {
            result.insert(kind, estimator_for(kind).estimate(series, &params));
        }
        Ok(result)
    }
}
