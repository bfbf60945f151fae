//! Gap and go: buy the first break of the opening candle's high after a gap up.

use chrono::NaiveDate;
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
use crate::market::BarSeries;
use crate::utils::percent_change;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GapAndGoConfig {
    /// Minimum opening gap versus the prior session close, in percent
    #[serde(with = "rust_decimal::serde::float")]
    pub min_gap_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_risk: Decimal,
}

impl Default for GapAndGoConfig {
    fn default() -> Self {
        Self {
            min_gap_pct: dec!(4),
            reward_risk: default_reward_risk(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FirstCandle {
    session: NaiveDate,
    high: Decimal,
}

#[derive(Debug, Clone)]
pub struct GapAndGoStrategy {
    config: GapAndGoConfig,
    first_candles: HashMap<String, FirstCandle>,
}

impl GapAndGoStrategy {
    pub fn new(config: GapAndGoConfig) -> Result<Self, ConfigurationError> {
        let kind = StrategyKind::GapAndGo;
        ensure_param(kind, config.min_gap_pct >= Decimal::ZERO, "min_gap_pct must be >= 0")?;
        ensure_param(kind, config.reward_risk > Decimal::ZERO, "reward_risk must be > 0")?;
        Ok(Self {
            config,
            first_candles: HashMap::new(),
        })
    }

    pub fn from_params(params: &serde_json::Value) -> Result<Box<dyn Strategy>, ConfigurationError> {
        let config = parse_params(StrategyKind::GapAndGo, params)?;
        Ok(Box::new(Self::new(config)?))
    }
}

impl Strategy for GapAndGoStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GapAndGo
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }

    fn required_bars(&self) -> usize {
        2
    }

    fn check_signal(&mut self, series: &BarSeries, _rvol: Decimal) -> Option<SignalProposal> {
        let first = series.session_bars().first()?;
        let prev_close = series.prior_session_close()?;

        let gap = percent_change(first.open, prev_close);
        if gap < self.config.min_gap_pct {
            return None;
        }

        let session = first.session_date();
        let high = match self.first_candles.get(&series.symbol) {
            Some(candle) if candle.session == session => candle.high,
            _ => {
                trace!(symbol = %series.symbol, %gap, high = %first.high, "Recorded first candle");
                self.first_candles.insert(
                    series.symbol.clone(),
                    FirstCandle {
                        session,
                        high: first.high,
                    },
                );
                return None;
            }
        };

        let latest = series.latest()?;
        if latest.close <= high {
            return None;
        }

        SignalProposal::from_stop(
            &series.symbol,
            SignalSide::Buy,
            latest.close,
            latest.low,
            self.config.reward_risk,
        )
    }
}
