//! Data export module
//!
//! Stores computed volatility tables to Parquet and reads them back

mod parquet;

pub use parquet::{volatility_schema, VolatilityReader, VolatilityTable, VolatilityWriter};
