//! One-shot pass over the universe, ranked by percent change.

use tracing::{debug, info, instrument, warn};

use crate::error::ScanError;
use crate::market::MarketDataProvider;
use crate::signals::Signal;

use super::{MarketScanner, ScanResult};

/// Keep baseline BUY results, highest percent change first, at most `size`.
pub fn rank(mut results: Vec<ScanResult>, size: usize) -> Vec<ScanResult> {
    results.retain(|r| r.signal == Signal::Buy);
    // Stable sort keeps scan order among equal moves
    results.sort_by(|a, b| b.pct_change.cmp(&a.pct_change));
    results.truncate(size);
    results
}

/// Scan every symbol once without a strategy and rank the qualifiers.
///
/// Headlines are only looked up for symbols that made the cut.
#[instrument(skip(provider, scanner, universe), fields(provider = provider.name()))]
pub async fn build_watchlist(
    provider: &dyn MarketDataProvider,
    scanner: &MarketScanner,
    universe: &[String],
    size: usize,
) -> Vec<ScanResult> {
    let mut results = Vec::new();
    let mut skipped = 0usize;

    for symbol in universe {
        let outcome = match provider.fetch(symbol).await {
            Ok(snapshot) => scanner.scan(&snapshot, None),
            Err(e) => Err(ScanError::from(e)),
        };
        match outcome {
            Ok(result) => results.push(result),
            Err(ScanError::DataUnavailable { have, need, .. }) => {
                debug!(%symbol, have, need, "Skipped: insufficient history");
                skipped += 1;
            }
            Err(e) => {
                warn!(%symbol, error = %e, "Skipped: fetch failed");
                skipped += 1;
            }
        }
    }

    let mut ranked = rank(results, size);
    for result in ranked.iter_mut().filter(|r| r.headline.is_none()) {
        match provider.latest_headline(&result.symbol).await {
            Ok(headline) => result.headline = headline,
            Err(e) => debug!(symbol = %result.symbol, error = %e, "Headline lookup failed"),
        }
    }

    info!(
        scanned = universe.len(),
        skipped,
        qualified = ranked.len(),
        "Watchlist built"
    );

    ranked
}
