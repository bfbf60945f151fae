//! In-memory market data for offline runs and scenario tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use super::traits::MarketDataProvider;
use super::types::MarketSnapshot;
use crate::error::ProviderError;

/// Mock provider serving preloaded snapshots.
#[derive(Debug, Default, Clone)]
pub struct MockMarketData {
    snapshots: Arc<RwLock<HashMap<String, MarketSnapshot>>>,
    headlines: Arc<RwLock<HashMap<String, String>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    fetch_count: Arc<AtomicU64>,
    latency: Option<Duration>,
    headline_latency: Option<Duration>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate provider latency on every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Simulate a slow news lookup.
    pub fn with_headline_latency(mut self, latency: Duration) -> Self {
        self.headline_latency = Some(latency);
        self
    }

    /// Set or replace the snapshot served for its symbol.
    pub async fn set_snapshot(&self, snapshot: MarketSnapshot) {
        self.snapshots
            .write()
            .await
            .insert(snapshot.series.symbol.clone(), snapshot);
    }

    pub async fn set_headline(&self, symbol: &str, headline: &str) {
        self.headlines
            .write()
            .await
            .insert(symbol.to_string(), headline.to_string());
    }

    /// Make every fetch for `symbol` fail.
    pub async fn fail_symbol(&self, symbol: &str) {
        self.failing.write().await.insert(symbol.to_string());
    }

    /// Total fetches served, including failures.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, symbol: &str) -> Result<MarketSnapshot, ProviderError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.read().await.contains(symbol) {
            debug!(symbol, "Mock fetch failure");
            return Err(ProviderError::Payload(format!("simulated failure for {symbol}")));
        }

        self.snapshots
            .read()
            .await
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownSymbol(symbol.to_string()))
    }

    async fn latest_headline(&self, symbol: &str) -> Result<Option<String>, ProviderError> {
        if let Some(latency) = self.headline_latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.headlines.read().await.get(symbol).cloned())
    }
}
