//! # Momentum Scanner
//!
//! Streams momentum scans of a symbol universe to WebSocket clients, runs a
//! swappable signal strategy against each symbol, and sizes positions for the
//! cycle's BUY candidates from a fixed capital budget.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `market`: Market data providers (Yahoo chart API, CSV, in-memory mock)
//! - `signals`: Strategy trait, indicator math, and the six strategy families
//! - `strategy`: Per-symbol scanner, capital allocator, watchlist ranking
//! - `server`: WebSocket front end and the per-connection scan session
//! - `alerts`: Best-effort notifications with per-symbol cooldown
//! - `error`: Error taxonomy
//! - `utils`: Shared utilities and decimal arithmetic

pub mod alerts;
pub mod config;
pub mod error;
pub mod market;
pub mod server;
pub mod signals;
pub mod strategy;
pub mod utils;

pub use config::Config;
