//! Opening range breakout.
//!
//! Records the high/low of the bars inside the opening window of the current
//! session. Once the window has closed, a close above the range high (or below
//! the range low) with relative volume above the threshold emits BUY (SELL),
//! stopped at the range midpoint.

use chrono::{Duration, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use super::{
    default_reward_risk, ensure_param, parse_params, SignalProposal, SignalSide, Strategy,
    StrategyKind,
};
use crate::error::ConfigurationError;
use crate::market::{Bar, BarSeries};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrbConfig {
    /// Length of the opening window in minutes
    pub range_minutes: u32,
    /// Session open, `HH:MM` wall-clock
    pub session_open: String,
    /// Offset applied to bar timestamps (UTC) to get exchange wall-clock time
    pub utc_offset_minutes: i32,
    /// Relative volume must exceed this
    #[serde(with = "rust_decimal::serde::float")]
    pub rvol_threshold: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_risk: Decimal,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            range_minutes: 15,
            session_open: "09:30".to_string(),
            utc_offset_minutes: 0,
            rvol_threshold: dec!(1.5),
            reward_risk: default_reward_risk(),
        }
    }
}

/// Opening range recorded for one symbol and session.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OpeningRange {
    session: NaiveDate,
    high: Decimal,
    low: Decimal,
}

impl OpeningRange {
    fn midpoint(&self) -> Decimal {
        (self.high + self.low) / Decimal::TWO
    }
}

#[derive(Debug, Clone)]
pub struct OrbStrategy {
    config: OrbConfig,
    session_open: NaiveTime,
    ranges: HashMap<String, OpeningRange>,
}

impl OrbStrategy {
    pub fn new(config: OrbConfig) -> Result<Self, ConfigurationError> {
        let kind = StrategyKind::OpeningRangeBreakout;
        ensure_param(kind, config.range_minutes > 0, "range_minutes must be > 0")?;
        ensure_param(
            kind,
            config.rvol_threshold >= Decimal::ZERO,
            "rvol_threshold must be >= 0",
        )?;
        ensure_param(kind, config.reward_risk > Decimal::ZERO, "reward_risk must be > 0")?;
        let session_open = NaiveTime::parse_from_str(&config.session_open, "%H:%M").map_err(|_| {
            ConfigurationError::InvalidParameters {
                strategy: kind.name().to_string(),
                reason: format!("session_open '{}' is not HH:MM", config.session_open),
            }
        })?;

        Ok(Self {
            config,
            session_open,
            ranges: HashMap::new(),
        })
    }

    pub fn from_params(params: &serde_json::Value) -> Result<Box<dyn Strategy>, ConfigurationError> {
        let config = parse_params(StrategyKind::OpeningRangeBreakout, params)?;
        Ok(Box::new(Self::new(config)?))
    }

    fn local(&self, bar: &Bar) -> chrono::NaiveDateTime {
        bar.timestamp.naive_utc() + Duration::minutes(i64::from(self.config.utc_offset_minutes))
    }

    /// Range for the latest bar's session, computing it once the window has closed.
    fn opening_range(&mut self, series: &BarSeries) -> Option<OpeningRange> {
        let latest = self.local(series.latest()?);
        let session = latest.date();

        if let Some(range) = self.ranges.get(&series.symbol) {
            if range.session == session {
                return Some(*range);
            }
        }

        let window_start = session.and_time(self.session_open);
        let window_end = window_start + Duration::minutes(i64::from(self.config.range_minutes));
        if latest < window_end {
            return None;
        }

        let mut in_window = series.bars().iter().filter(|bar| {
            let t = self.local(bar);
            t >= window_start && t < window_end
        });
        let first = in_window.next()?;
        let (high, low) = in_window.fold((first.high, first.low), |(h, l), bar| {
            (h.max(bar.high), l.min(bar.low))
        });

        let range = OpeningRange { session, high, low };
        trace!(symbol = %series.symbol, %high, %low, "Opening range established");
        self.ranges.insert(series.symbol.clone(), range);
        Some(range)
    }
}

impl Strategy for OrbStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::OpeningRangeBreakout
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }

    fn required_bars(&self) -> usize {
        1
    }

    fn check_signal(&mut self, series: &BarSeries, rvol: Decimal) -> Option<SignalProposal> {
        let range = self.opening_range(series)?;
        let latest = series.latest()?;

        if rvol <= self.config.rvol_threshold {
            return None;
        }

        let side = if latest.close > range.high {
            SignalSide::Buy
        } else if latest.close < range.low {
            SignalSide::Sell
        } else {
            return None;
        };

        SignalProposal::from_stop(
            &series.symbol,
            side,
            latest.close,
            range.midpoint(),
            self.config.reward_risk,
        )
    }
}
