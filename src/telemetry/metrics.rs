//! Prometheus metrics

use crate::model::VolatilityKind;
use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Per-ticker chart requests issued
    FetchRequests,
    /// Per-ticker chart requests that failed
    FetchFailures,
    CacheHits,
    CacheMisses,
    /// Tickers that produced a report
    TickersAnalyzed,
    /// Tickers rejected by series validation or the engine
    TickerFailures,
    SpikesDetected,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::FetchRequests => "realized_vol_fetch_requests_total",
            CounterMetric::FetchFailures => "realized_vol_fetch_failures_total",
            CounterMetric::CacheHits => "realized_vol_cache_hits_total",
            CounterMetric::CacheMisses => "realized_vol_cache_misses_total",
            CounterMetric::TickersAnalyzed => "realized_vol_tickers_analyzed_total",
            CounterMetric::TickerFailures => "realized_vol_ticker_failures_total",
            CounterMetric::SpikesDetected => "realized_vol_spikes_detected_total",
        }
    }
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// One chart request, send to body read
    Fetch,
    /// All estimators over one ticker
    Engine,
}

impl LatencyMetric {
    fn name(self) -> &'static str {
        match self {
            LatencyMetric::Fetch => "realized_vol_fetch_latency_ms",
            LatencyMetric::Engine => "realized_vol_engine_latency_ms",
        }
    }
}

/// Increment a counter
pub fn increment(metric: CounterMetric, by: u64) {
    metrics::counter!(metric.name()).increment(by);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    metrics::histogram!(metric.name()).record(ms);
    tracing::trace!(metric = metric.name(), value_ms = ms, "Recording latency");
}

/// Set the most recent estimate for a ticker
pub fn set_latest_volatility(ticker: &str, kind: VolatilityKind, value: f64) {
    metrics::gauge!(
        "realized_vol_latest",
        "ticker" => ticker.to_string(),
        "estimator" => kind.column_name()
    )
    .set(value);
}
