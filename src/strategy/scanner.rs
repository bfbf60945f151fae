//! Per-symbol scan pipeline: features, baseline qualification, strategy signal.

use rust_decimal::Decimal;
use tracing::trace;

use crate::config::ScannerConfig;
use crate::error::ScanError;
use crate::market::{BarSeries, InstrumentSnapshot, MarketSnapshot};
use crate::signals::{Signal, SignalProposal, Strategy, StrategyKind};
use crate::utils::{mean, percent_change, safe_div};

/// Outcome of scanning one symbol in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub symbol: String,
    pub price: Decimal,
    pub pct_change: Decimal,
    pub rvol: Decimal,
    pub signal: Signal,
    /// Trade proposed by the active strategy, if it fired
    pub proposal: Option<SignalProposal>,
    /// Strategy that produced `proposal`
    pub strategy: Option<StrategyKind>,
    pub float_shares: Option<Decimal>,
    pub headline: Option<String>,
}

impl ScanResult {
    /// BUY or SELL, from either the baseline filter or the strategy.
    pub fn is_actionable(&self) -> bool {
        self.signal != Signal::Wait
    }
}

/// Derives momentum/volume features and classifies a symbol.
///
/// Pure and non-suspending: fetching happens in the caller.
#[derive(Debug, Clone)]
pub struct MarketScanner {
    config: ScannerConfig,
}

impl MarketScanner {
    /// Create a new scanner with the given configuration.
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Compute the cycle-scoped feature snapshot.
    ///
    /// Fails with `DataUnavailable` when the series is shorter than
    /// `min_lookback_days` (never fewer than two bars).
    pub fn features(&self, snapshot: &MarketSnapshot) -> Result<InstrumentSnapshot, ScanError> {
        let series = &snapshot.series;
        let need = self.config.min_lookback_days.max(2);
        let (Some(latest), Some(previous)) = (series.latest(), series.previous()) else {
            return Err(self.unavailable(series, need));
        };
        if series.len() < need {
            return Err(self.unavailable(series, need));
        }

        Ok(InstrumentSnapshot {
            symbol: series.symbol.clone(),
            price: latest.close,
            previous_close: previous.close,
            pct_change: percent_change(latest.close, previous.close),
            rvol: self.relative_volume(series),
            float_shares: snapshot.float_shares,
            headline: snapshot.headline.clone(),
        })
    }

    /// Latest volume over the mean volume of the `rvol_window` bars before it.
    /// Zero when that average is zero.
    pub fn relative_volume(&self, series: &BarSeries) -> Decimal {
        let Some(latest) = series.latest() else {
            return Decimal::ZERO;
        };
        let prior = &series.bars()[..series.len() - 1];
        let window = &prior[prior.len().saturating_sub(self.config.rvol_window)..];
        let volumes: Vec<Decimal> = window.iter().map(|b| b.volume).collect();
        safe_div(latest.volume, mean(&volumes))
    }

    /// Baseline BUY/WAIT from momentum, relative volume, the price band and
    /// the float ceiling. An unknown float never excludes a symbol.
    pub fn classify(&self, instrument: &InstrumentSnapshot, previous_high: Decimal) -> Signal {
        let momentum =
            instrument.pct_change >= self.config.min_gain_pct || instrument.price > previous_high;
        let in_band = self.config.min_price.map_or(true, |min| instrument.price >= min)
            && self.config.max_price.map_or(true, |max| instrument.price <= max);
        let small_float = match (instrument.float_shares, self.config.max_float) {
            (Some(float), Some(max)) => float <= max,
            _ => true,
        };

        if momentum && in_band && small_float && instrument.rvol >= self.config.min_rvol {
            Signal::Buy
        } else {
            Signal::Wait
        }
    }

    /// Scan one symbol. When a strategy is supplied it sees the full series and
    /// the computed relative volume; its proposal overrides the baseline signal.
    pub fn scan(
        &self,
        snapshot: &MarketSnapshot,
        strategy: Option<&mut dyn Strategy>,
    ) -> Result<ScanResult, ScanError> {
        let instrument = self.features(snapshot)?;
        let series = &snapshot.series;
        let previous_high = series
            .previous()
            .map(|b| b.high)
            .unwrap_or(instrument.previous_close);

        let mut signal = self.classify(&instrument, previous_high);
        let mut proposal = None;
        let mut kind = None;

        if let Some(strategy) = strategy {
            if let Some(p) = strategy.check_signal(series, instrument.rvol) {
                signal = p.side.into();
                kind = Some(strategy.kind());
                proposal = Some(p);
            }
        }

        trace!(
            symbol = %instrument.symbol,
            price = %instrument.price,
            pct_change = %instrument.pct_change,
            rvol = %instrument.rvol,
            %signal,
            "Symbol scanned"
        );

        Ok(ScanResult {
            symbol: instrument.symbol,
            price: instrument.price,
            pct_change: instrument.pct_change,
            rvol: instrument.rvol,
            signal,
            proposal,
            strategy: kind,
            float_shares: instrument.float_shares,
            headline: instrument.headline,
        })
    }

    fn unavailable(&self, series: &BarSeries, need: usize) -> ScanError {
        ScanError::DataUnavailable {
            symbol: series.symbol.clone(),
            have: series.len(),
            need,
        }
    }
}
