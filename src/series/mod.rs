//! Price series module
//!
//! Normalizes raw daily OHLC bars into an immutable, validated table

mod price;
mod types;

pub use price::PriceSeries;
pub use types::{Bar, FillPolicy, PriceField, RawBar};
