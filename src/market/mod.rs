//! Market data collaborators.
//!
//! ## Providers
//! - `YahooChartProvider`: chart bars, float and headlines over HTTP
//! - `CsvBarProvider`: per-symbol CSV files on disk
//! - `MockMarketData`: in-memory snapshots with failure injection

mod csv;
pub mod mock;
mod traits;
mod types;
mod yahoo;

pub use csv::{parse_bars, CsvBarProvider};
pub use mock::MockMarketData;
#[cfg(test)]
pub use traits::MockMarketDataProvider;
pub use traits::MarketDataProvider;
pub use types::*;
pub use yahoo::{YahooChartProvider, YAHOO_API_URL};
