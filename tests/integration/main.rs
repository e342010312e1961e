//! Integration tests

mod e2e_test;
mod engine_test;
mod export_test;
mod feed_test;

use chrono::{Duration, NaiveDate};
use realized_vol::series::RawBar;

/// Consecutive daily bars with open = high = low = close
pub fn flat_bars(closes: &[f64]) -> Vec<RawBar> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| RawBar::new(start + Duration::days(i as i64), c, c, c, c))
        .collect()
}

/// Consecutive daily bars with a symmetric 1% range around the close
pub fn ranged_bars(closes: &[f64]) -> Vec<RawBar> {
    flat_bars(closes)
        .into_iter()
        .map(|mut bar| {
            let c = bar.close.unwrap_or_default();
            bar.high = Some(c * 1.01);
            bar.low = Some(c * 0.99);
            bar
        })
        .collect()
}

/// Deterministic oscillating closes
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 10.0 * (i as f64 * 0.7).sin() + i as f64 * 0.05)
        .collect()
}
