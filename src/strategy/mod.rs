//! Scan-and-allocate pipeline.
//!
//! Contains the core logic for:
//! - Per-symbol feature computation and baseline qualification
//! - Capital allocation across a cycle's BUY candidates
//! - One-shot watchlist ranking

mod allocator;
mod scanner;
mod watchlist;

pub use allocator::{Allocation, CapitalAllocator};
pub use scanner::{MarketScanner, ScanResult};
pub use watchlist::{build_watchlist, rank};
