//! Analysis module
//!
//! Runs normalization, the volatility engine and spike detection for each
//! fetched ticker

mod types;

pub use types::{AnalysisError, TickerReport};

use crate::config::Config;
use crate::error::Result;
use crate::feed::{FetchRequest, FetchResponse};
use crate::model::{VolatilityEngine, VolatilityKind};
use crate::series::{FillPolicy, PriceSeries, RawBar};
use crate::signal::SpikeDetector;
use crate::telemetry::{
    increment, record_latency, set_latest_volatility, CounterMetric, LatencyMetric,
};
use std::time::Instant;

/// Settings shared by every ticker in a run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub engine: VolatilityEngine,
    pub fill_policy: FillPolicy,
    pub detector: SpikeDetector,
    /// Series the spike detector runs on
    pub spike_source: VolatilityKind,
    /// Series to compute; empty means all four
    pub kinds: Vec<VolatilityKind>,
}

impl AnalysisSettings {
    /// All four estimators with default settings for the given window
    pub fn new(window: usize) -> Result<Self> {
        Ok(Self {
            engine: VolatilityEngine::new(window)?,
            fill_policy: FillPolicy::default(),
            detector: SpikeDetector::default(),
            spike_source: VolatilityKind::Realized,
            kinds: VolatilityKind::ALL.to_vec(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            engine: VolatilityEngine::from_config(&config.engine)?,
            fill_policy: config.engine.fill_policy,
            detector: SpikeDetector::from_config(&config.spikes),
            spike_source: config.spikes.source,
            kinds: VolatilityKind::ALL.to_vec(),
        })
    }

    pub fn with_kinds(mut self, kinds: Vec<VolatilityKind>) -> Self {
        self.kinds = kinds;
        self
    }

    fn kinds(&self) -> &[VolatilityKind] {
        if self.kinds.is_empty() {
            &VolatilityKind::ALL[..]
        } else {
            self.kinds.as_slice()
        }
    }
}

/// Normalize one ticker's bars, estimate, and detect spikes.
///
/// The spike source series is always computed, even when it is not among the
/// selected kinds, but only the selected kinds are reported.
pub fn analyze_ticker(
    symbol: &str,
    raw_bars: Vec<RawBar>,
    settings: &AnalysisSettings,
) -> std::result::Result<TickerReport, AnalysisError> {
    let wrap = |source| AnalysisError::Volatility {
        symbol: symbol.to_string(),
        source,
    };

    let series = PriceSeries::normalize(raw_bars, settings.fill_policy).map_err(wrap)?;

    let mut kinds = settings.kinds().to_vec();
    if !kinds.contains(&settings.spike_source) {
        kinds.push(settings.spike_source);
    }

    let started = Instant::now();
    let computed = settings.engine.calculate(&series, &kinds).map_err(wrap)?;
    record_latency(LatencyMetric::Engine, started.elapsed());

    let spikes = computed
        .series(settings.spike_source)
        .map(|s| settings.detector.detect(&s))
        .unwrap_or_default();
    let result = computed.select(settings.kinds());

    for kind in result.kinds() {
        if let Some((_, value)) = result.series(kind).and_then(|s| s.latest()) {
            set_latest_volatility(symbol, kind, value);
        }
    }
    increment(CounterMetric::SpikesDetected, spikes.len() as u64);

    tracing::debug!(
        ticker = symbol,
        bars = series.len(),
        spikes = spikes.len(),
        "Analyzed ticker"
    );

    Ok(TickerReport {
        symbol: symbol.to_string(),
        closes: series.closes().to_vec(),
        result,
        spikes,
        flagged: series.flagged_dates().to_vec(),
    })
}

/// Analyze every requested ticker, one result each, in ticker order.
///
/// A failing ticker never aborts the others.
pub fn analyze_all(
    request: &FetchRequest,
    mut response: FetchResponse,
    settings: &AnalysisSettings,
) -> Vec<std::result::Result<TickerReport, AnalysisError>> {
    request
        .tickers
        .iter()
        .map(|symbol| {
            let outcome = match response.remove(symbol) {
                Some(bars) => analyze_ticker(symbol, bars, settings),
                None => Err(AnalysisError::MissingTicker(symbol.clone())),
            };
            match &outcome {
                Ok(_) => increment(CounterMetric::TickersAnalyzed, 1),
                Err(e) => {
                    increment(CounterMetric::TickerFailures, 1);
                    tracing::warn!(ticker = %symbol, error = %e, "Ticker analysis failed");
                }
            }
            outcome
        })
        .collect()
}
