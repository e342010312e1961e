//! Yahoo Finance chart API client
//!
//! Fetches daily OHLC bars from the v8 chart endpoint, one request per
//! ticker, issued concurrently.

use super::{FeedError, FetchRequest, FetchResponse, PriceFetcher};
use crate::config::FeedConfig;
use crate::series::RawBar;
use crate::telemetry::{increment, record_latency, CounterMetric, LatencyMetric};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use futures_util::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Yahoo Finance API base URL
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com";

/// Configuration for the Yahoo client
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Base URL for the chart API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header; the endpoint rejects requests without one
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for YahooConfig {
    fn from(config: &FeedConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Client for Yahoo's chart API
pub struct YahooFetcher {
    config: YahooConfig,
    client: Client,
}

impl YahooFetcher {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, FeedError> {
        Self::with_config(YahooConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: YahooConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.config.base_url, symbol)
    }

    /// Fetch daily bars for one symbol over `[start, end)`
    async fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, FeedError> {
        let url = self.chart_url(symbol);
        let period1 = start.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp()).unwrap_or(0);
        let period2 = end.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp()).unwrap_or(0);

        tracing::debug!(url = %url, symbol, %start, %end, "Fetching daily bars");

        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        record_latency(LatencyMetric::Fetch, started.elapsed());

        if !status.is_success() {
            // Error bodies usually carry a description in the chart envelope
            let message = serde_json::from_str::<ChartEnvelope>(&body)
                .ok()
                .and_then(|e| e.chart.error)
                .map(|e| format!("{}: {}", e.code, e.description))
                .unwrap_or(body);
            return Err(FeedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parse_chart(symbol, &body)
    }
}

#[async_trait]
impl PriceFetcher for YahooFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FeedError> {
        let fetches = request.tickers.iter().map(|symbol| async move {
            let result = self.fetch_symbol(symbol, request.start, request.end).await;
            (symbol.clone(), result)
        });

        let mut response = FetchResponse::new();
        let mut last_error = None;

        for (symbol, result) in join_all(fetches).await {
            increment(CounterMetric::FetchRequests, 1);
            match result {
                Ok(bars) if !bars.is_empty() => {
                    tracing::debug!(symbol = %symbol, bars = bars.len(), "Fetched bars");
                    response.insert(symbol, bars);
                }
                Ok(_) => {
                    tracing::warn!(symbol = %symbol, "No bars returned");
                }
                Err(e) => {
                    increment(CounterMetric::FetchFailures, 1);
                    tracing::warn!(symbol = %symbol, error = %e, "Fetch failed");
                    last_error = Some(e);
                }
            }
        }

        if response.is_empty() {
            let tickers = request.tickers.iter().cloned().collect::<Vec<_>>().join(",");
            return Err(last_error.unwrap_or(FeedError::NoData(tickers)));
        }

        tracing::info!(
            requested = request.tickers.len(),
            returned = response.len(),
            "Fetched price data"
        );

        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Parse a chart response body into raw bars.
///
/// Dates are the exchange-local trading day. Null prices stay `None` so the
/// series fill policy decides what to do with them.
fn parse_chart(symbol: &str, body: &str) -> Result<Vec<RawBar>, FeedError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.chart.error {
        return Err(FeedError::Api {
            status: 200,
            message: format!("{}: {}", error.code, error.description),
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| FeedError::NoData(symbol.to_string()))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;
    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| FeedError::InvalidRequest(format!("bad timestamp {}", ts)))?
            .date_naive();

        bars.push(RawBar {
            date,
            open: at(&quote.open, i),
            high: at(&quote.high, i),
            low: at(&quote.low, i),
            close: at(&quote.close, i),
        });
    }

    Ok(bars)
}
