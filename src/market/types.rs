//! Market data types shared by providers, strategies and the scanner.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    /// Typical price `(high + low + close) / 3`.
    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }

    /// UTC calendar date of the bar.
    pub fn session_date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Chronological bar history for one instrument.
///
/// Immutable once fetched for a scan step.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, ordering bars by timestamp.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar.
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Bar immediately before the latest one.
    pub fn previous(&self) -> Option<&Bar> {
        self.bars.len().checked_sub(2).map(|i| &self.bars[i])
    }

    /// The last `n` bars, or all of them when fewer exist.
    pub fn tail(&self, n: usize) -> &[Bar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Bars that share the latest bar's session date.
    pub fn session_bars(&self) -> &[Bar] {
        let Some(date) = self.latest().map(Bar::session_date) else {
            return &[];
        };
        let start = self
            .bars
            .iter()
            .rposition(|b| b.session_date() != date)
            .map_or(0, |i| i + 1);
        &self.bars[start..]
    }

    /// Close of the last bar before the current session.
    pub fn prior_session_close(&self) -> Option<Decimal> {
        let session_len = self.session_bars().len();
        self.bars
            .len()
            .checked_sub(session_len + 1)
            .map(|i| self.bars[i].close)
    }
}

/// Raw per-symbol data handed over by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub series: BarSeries,
    /// Float or shares outstanding, when the provider knows it.
    pub float_shares: Option<Decimal>,
    pub headline: Option<String>,
}

impl MarketSnapshot {
    pub fn new(series: BarSeries) -> Self {
        Self {
            series,
            float_shares: None,
            headline: None,
        }
    }

    pub fn with_float(mut self, float_shares: Decimal) -> Self {
        self.float_shares = Some(float_shares);
        self
    }

    pub fn with_headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = Some(headline.into());
        self
    }
}

/// Cycle-scoped features derived from a snapshot. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSnapshot {
    pub symbol: String,
    pub price: Decimal,
    pub previous_close: Decimal,
    pub pct_change: Decimal,
    pub rvol: Decimal,
    pub float_shares: Option<Decimal>,
    pub headline: Option<String>,
}
