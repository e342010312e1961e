//! Price feed module
//!
//! Daily OHLC bars from Yahoo Finance, with an LRU cache in front, and the
//! S&P 500 constituent list used to pick a universe

mod cache;
mod constituents;
mod types;
mod yahoo;

pub use cache::{CachedFetcher, LruCache};
pub use constituents::{parse_constituents, ConstituentsFetcher, SP500_URL};
pub use types::{FeedError, FetchRequest, FetchResponse};
pub use yahoo::{YahooConfig, YahooFetcher, YAHOO_CHART_URL};

use async_trait::async_trait;

/// Trait for historical price sources
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Fetch raw daily bars for every ticker in the request.
    ///
    /// Tickers with no data are omitted from the response rather than
    /// failing the whole request.
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FeedError>;
}
