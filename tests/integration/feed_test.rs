//! Integration tests for the price feed module

use async_trait::async_trait;
use chrono::NaiveDate;
use realized_vol::config::FeedConfig;
use realized_vol::feed::{
    CachedFetcher, FeedError, FetchRequest, FetchResponse, PriceFetcher, YahooConfig, YahooFetcher,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serves fixed bars and counts upstream calls
pub struct StaticFetcher {
    pub calls: Arc<AtomicUsize>,
    pub closes: Vec<f64>,
}

#[async_trait]
impl PriceFetcher for StaticFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(request
            .tickers
            .iter()
            .filter(|t| !t.starts_with("DELISTED"))
            .map(|t| (t.clone(), crate::ranged_bars(&self.closes)))
            .collect())
    }
}

fn request(tickers: &str) -> FetchRequest {
    FetchRequest::new(
        FetchRequest::parse_tickers(tickers),
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_cache_capacity_from_config() {
    let calls = Arc::new(AtomicUsize::new(0));
    let config = FeedConfig {
        cache_capacity: 1,
        ..FeedConfig::default()
    };
    let fetcher = CachedFetcher::from_config(
        StaticFetcher {
            calls: calls.clone(),
            closes: vec![100.0, 101.0],
        },
        &config,
    );

    fetcher.fetch(&request("AAPL")).await.unwrap();
    fetcher.fetch(&request("AAPL")).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Capacity one: the second key evicts the first
    fetcher.fetch(&request("MSFT")).await.unwrap();
    fetcher.fetch(&request("AAPL")).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(fetcher.cached().await, 1);
}

#[tokio::test]
async fn test_cache_shared_across_tasks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = Arc::new(CachedFetcher::new(
        StaticFetcher {
            calls: calls.clone(),
            closes: vec![100.0, 101.0],
        },
        8,
        None,
    ));

    fetcher.fetch(&request("SPY")).await.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.fetch(&request("spy")).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_yahoo_fetcher_from_feed_config() {
    let config = FeedConfig::default();
    assert!(YahooFetcher::with_config(YahooConfig::from(&config)).is_ok());
}
