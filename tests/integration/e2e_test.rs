//! End-to-end integration tests

use crate::feed_test::StaticFetcher;
use crate::wave;
use chrono::NaiveDate;
use realized_vol::analysis::{analyze_all, AnalysisError, AnalysisSettings};
use realized_vol::config::Config;
use realized_vol::feed::{CachedFetcher, FetchRequest, PriceFetcher};
use realized_vol::model::VolatilityKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_config_example_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");
    let config = Config::load(path).unwrap();
    assert_eq!(config.engine.window, 21);
    assert_eq!(config.spikes.source, VolatilityKind::Realized);

    let settings = AnalysisSettings::from_config(&config).unwrap();
    assert_eq!(settings.engine.window(), 21);
    assert!(settings.engine.is_annualized());
}

#[tokio::test]
async fn test_fetch_analyze_pipeline() {
    let mut closes = wave(300);
    // A single shock day
    closes[200] *= 1.4;

    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = CachedFetcher::new(
        StaticFetcher {
            calls: calls.clone(),
            closes,
        },
        4,
        None,
    );

    let request = FetchRequest::new(
        ["AAPL", "DELISTEDX"],
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    )
    .unwrap();

    let settings = AnalysisSettings::from_config(&Config::default()).unwrap();
    let response = fetcher.fetch(&request).await.unwrap();
    let results = analyze_all(&request, response, &settings);

    assert_eq!(results.len(), 2);
    let report = results[0].as_ref().unwrap();
    assert_eq!(report.symbol, "AAPL");
    assert_eq!(report.result.kinds().count(), 4);
    assert_eq!(report.closes.len(), 300);

    assert!(!report.spikes.is_empty());
    assert!(report.spikes.len() <= 10);
    let spike_window = NaiveDate::from_ymd_opt(2023, 7, 21).unwrap()
        ..=NaiveDate::from_ymd_opt(2023, 8, 11).unwrap();
    assert!(spike_window.contains(&report.spikes[0].date));
    for pair in report.spikes.windows(2) {
        assert!(pair[0].magnitude >= pair[1].magnitude);
    }
    for spike in &report.spikes {
        assert!(spike.y_position <= spike.magnitude);
        assert!(spike.label.starts_with("Spike: "));
    }

    assert_eq!(
        results[1],
        Err(AnalysisError::MissingTicker("DELISTEDX".to_string()))
    );

    // Second pass is served from the cache
    fetcher.fetch(&request).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
