//! Price feed types

use crate::series::RawBar;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Price fetch errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failure (connect, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Upstream answered with an error
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    /// Payload did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// HTML page did not contain what we scrape from it
    #[error("Failed to parse page: {0}")]
    Html(String),
    /// Nothing came back for the requested symbols
    #[error("No data for {0}")]
    NoData(String),
    /// Request rejected before hitting the network
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Daily bars for a set of tickers over `[start, end)`.
///
/// Also the cache key: two requests for the same tickers in a different order
/// are the same request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    pub tickers: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchRequest {
    /// Build a request, trimming and upper-casing tickers
    pub fn new<I, S>(tickers: I, start: NaiveDate, end: NaiveDate) -> Result<Self, FeedError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tickers: BTreeSet<String> = tickers
            .into_iter()
            .map(|t| t.as_ref().trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();

        if tickers.is_empty() {
            return Err(FeedError::InvalidRequest("no tickers given".to_string()));
        }
        if start >= end {
            return Err(FeedError::InvalidRequest(format!(
                "start {} is not before end {}",
                start, end
            )));
        }

        Ok(Self { tickers, start, end })
    }

    /// Parse a comma-separated ticker list, e.g. `"aapl, msft,GOOG"`
    pub fn parse_tickers(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Raw bars per ticker, in date order as delivered
pub type FetchResponse = BTreeMap<String, Vec<RawBar>>;
