//! Provider-agnostic interface for historical bars and instrument metadata.

use async_trait::async_trait;

use super::types::MarketSnapshot;
use crate::error::ProviderError;

/// Source of per-symbol market data.
///
/// Implementations are pure data sources: no signal logic, no retries beyond
/// what the transport does on its own. A failure only ever skips the symbol
/// for the current cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Fetch the recent bar history (and any metadata) for `symbol`.
    async fn fetch(&self, symbol: &str) -> Result<MarketSnapshot, ProviderError>;

    /// Most recent headline for `symbol`, if the provider carries news.
    async fn latest_headline(&self, _symbol: &str) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }
}
