//! Pluggable signal strategies.
//!
//! Every strategy consumes a bar series plus the scanner's relative volume and
//! either stays silent or proposes a fully specified trade (entry, stop,
//! target). Strategies fail closed: a series shorter than the required
//! lookback yields no signal, never a panic.
//!
//! - `orb`: opening range breakout
//! - `mean_reversion`: Bollinger band reversion to the mean
//! - `macd`: MACD / signal line crossover
//! - `vwap`: pullback to VWAP from above
//! - `gap_and_go`: gap up, then a break of the first candle's high
//! - `bull_flag`: pole, three lower highs, breakout

mod bull_flag;
mod gap_and_go;
pub mod indicators;
mod macd;
mod mean_reversion;
mod orb;
mod registry;
mod vwap;

pub use bull_flag::{BullFlagConfig, BullFlagStrategy};
pub use gap_and_go::{GapAndGoConfig, GapAndGoStrategy};
pub use macd::{MacdConfig, MacdStrategy};
pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy};
pub use orb::{OrbConfig, OrbStrategy};
pub use registry::{create_strategy, StrategyKind};
pub use vwap::{VwapConfig, VwapStrategy};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::market::BarSeries;

/// Default reward distance as a multiple of risk distance.
pub const REWARD_RISK_RATIO: Decimal = dec!(2);

/// Direction of a proposed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalSide {
    Buy,
    Sell,
}

/// Per-symbol classification reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Wait,
    Buy,
    Sell,
}

impl From<SignalSide> for Signal {
    fn from(side: SignalSide) -> Self {
        match side {
            SignalSide::Buy => Signal::Buy,
            SignalSide::Sell => Signal::Sell,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Wait => write!(f, "WAIT"),
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
        }
    }
}

/// A fully specified trade idea.
///
/// Construction goes through [`SignalProposal::from_stop`] or
/// [`SignalProposal::from_target`], which enforce that stop and target sit on
/// opposite sides of entry for the side, and that reward = ratio × risk.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalProposal {
    pub symbol: String,
    pub side: SignalSide,
    pub entry: Decimal,
    pub stop_loss: Decimal,
    pub target: Decimal,
}

impl SignalProposal {
    /// Derive the target from a stop: target = entry ± ratio × |entry − stop|.
    ///
    /// Returns `None` when the stop is on the wrong side of entry.
    pub fn from_stop(
        symbol: &str,
        side: SignalSide,
        entry: Decimal,
        stop_loss: Decimal,
        reward_risk: Decimal,
    ) -> Option<Self> {
        let risk = match side {
            SignalSide::Buy => entry - stop_loss,
            SignalSide::Sell => stop_loss - entry,
        };
        if risk <= Decimal::ZERO || reward_risk <= Decimal::ZERO {
            return None;
        }

        let target = match side {
            SignalSide::Buy => entry + risk * reward_risk,
            SignalSide::Sell => entry - risk * reward_risk,
        };
        if target <= Decimal::ZERO {
            return None;
        }

        Some(Self {
            symbol: symbol.to_string(),
            side,
            entry,
            stop_loss,
            target,
        })
    }

    /// Derive the stop from a target: stop = entry ∓ |target − entry| / ratio.
    ///
    /// Returns `None` when the target is on the wrong side of entry.
    pub fn from_target(
        symbol: &str,
        side: SignalSide,
        entry: Decimal,
        target: Decimal,
        reward_risk: Decimal,
    ) -> Option<Self> {
        let reward = match side {
            SignalSide::Buy => target - entry,
            SignalSide::Sell => entry - target,
        };
        if reward <= Decimal::ZERO || reward_risk <= Decimal::ZERO {
            return None;
        }

        let risk = reward / reward_risk;
        let stop_loss = match side {
            SignalSide::Buy => entry - risk,
            SignalSide::Sell => entry + risk,
        };

        Some(Self {
            symbol: symbol.to_string(),
            side,
            entry,
            stop_loss,
            target,
        })
    }

    /// |entry − stop|
    pub fn risk(&self) -> Decimal {
        (self.entry - self.stop_loss).abs()
    }

    /// |target − entry|
    pub fn reward(&self) -> Decimal {
        (self.target - self.entry).abs()
    }

    /// Stop and target on the correct sides of entry for the side.
    pub fn is_well_formed(&self) -> bool {
        match self.side {
            SignalSide::Buy => self.stop_loss < self.entry && self.entry < self.target,
            SignalSide::Sell => self.target < self.entry && self.entry < self.stop_loss,
        }
    }
}

/// A swappable signal-generating algorithm.
///
/// `check_signal` takes `&mut self` because some strategies keep running state
/// (an established opening range, a first-candle high). That state is keyed by
/// symbol inside the instance, so replacing the instance discards it.
pub trait Strategy: Send + Sync + fmt::Debug {
    /// Registry identifier of this strategy family.
    fn kind(&self) -> StrategyKind;

    /// Current parameterization as a JSON mapping.
    fn parameters(&self) -> serde_json::Value;

    /// Minimum number of bars needed before a signal can be evaluated.
    fn required_bars(&self) -> usize;

    /// Evaluate the latest bar. Never panics on short input.
    fn check_signal(&mut self, series: &BarSeries, rvol: Decimal) -> Option<SignalProposal>;
}

/// Deserialize a strategy's parameter mapping, treating `null` as "all defaults".
pub(crate) fn parse_params<T>(
    kind: StrategyKind,
    params: &serde_json::Value,
) -> Result<T, crate::error::ConfigurationError>
where
    T: for<'de> Deserialize<'de>,
{
    let value = if params.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        params.clone()
    };
    serde_json::from_value(value).map_err(|e| crate::error::ConfigurationError::InvalidParameters {
        strategy: kind.name().to_string(),
        reason: e.to_string(),
    })
}

/// Shared guard used by every strategy config's `validate`.
pub(crate) fn ensure_param(
    kind: StrategyKind,
    condition: bool,
    reason: &str,
) -> Result<(), crate::error::ConfigurationError> {
    if condition {
        Ok(())
    } else {
        Err(crate::error::ConfigurationError::InvalidParameters {
            strategy: kind.name().to_string(),
            reason: reason.to_string(),
        })
    }
}

fn default_reward_risk() -> Decimal {
    REWARD_RISK_RATIO
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Bar builders shared by the strategy tests.

    use crate::market::{Bar, BarSeries};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    /// Bars one minute apart starting 2024-03-04 09:30 UTC, given as
    /// (open, high, low, close, volume).
    pub fn minute_series(symbol: &str, rows: &[(Decimal, Decimal, Decimal, Decimal, Decimal)]) -> BarSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap();
        let bars = rows
            .iter()
            .enumerate()
            .map(|(i, (open, high, low, close, volume))| Bar {
                timestamp: start + Duration::minutes(i as i64),
                open: *open,
                high: *high,
                low: *low,
                close: *close,
                volume: *volume,
            })
            .collect();
        BarSeries::new(symbol, bars)
    }

    /// Daily bars whose open/high/low all equal the close.
    pub fn close_series(symbol: &str, closes: &[Decimal]) -> BarSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: Decimal::from(1000),
            })
            .collect();
        BarSeries::new(symbol, bars)
    }
}
