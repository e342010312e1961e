//! realized-vol: rolling volatility estimation for daily OHLC price data
//!
//! This library provides the core components for:
//! - Normalizing raw daily bars into validated price series
//! - Realized, Parkinson, Garman-Klass and Hodges-Tompkins estimators
//! - Spike detection with stacked label placement
//! - Cached price fetching from Yahoo Finance
//! - Per-ticker analysis and Parquet export
//! - Structured logging and Prometheus metrics

pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod model;
pub mod series;
pub mod signal;
pub mod telemetry;

pub use error::{Result, VolError};
