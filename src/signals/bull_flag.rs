//! Bull flag breakout over the last six bars.
//!
//! Layout, oldest first: pole base, pole top (close up at least `pole_pct`),
//! three flag bars with strictly lower highs, then a breakout close above the
//! last flag high.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{
    default_reward_risk, ensure_param, parse_params, SignalProposal, SignalSide, Strategy,
    StrategyKind,
};
use crate::error::ConfigurationError;
use crate::market::BarSeries;

const PATTERN_BARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BullFlagConfig {
    #[serde(with = "rust_decimal::serde::float")]
    pub rvol_min: Decimal,
    /// Minimum one-bar pole move, in percent
    #[serde(with = "rust_decimal::serde::float")]
    pub pole_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_risk: Decimal,
}

impl Default for BullFlagConfig {
    fn default() -> Self {
        Self {
            rvol_min: dec!(5),
            pole_pct: dec!(5),
            reward_risk: default_reward_risk(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BullFlagStrategy {
    config: BullFlagConfig,
}

impl BullFlagStrategy {
    pub fn new(config: BullFlagConfig) -> Result<Self, ConfigurationError> {
        let kind = StrategyKind::BullFlag;
        ensure_param(kind, config.pole_pct > Decimal::ZERO, "pole_pct must be > 0")?;
        ensure_param(kind, config.reward_risk > Decimal::ZERO, "reward_risk must be > 0")?;
        Ok(Self { config })
    }

    pub fn from_params(params: &serde_json::Value) -> Result<Box<dyn Strategy>, ConfigurationError> {
        let config = parse_params(StrategyKind::BullFlag, params)?;
        Ok(Box::new(Self::new(config)?))
    }
}

impl Strategy for BullFlagStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BullFlag
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }

    fn required_bars(&self) -> usize {
        PATTERN_BARS
    }

    fn check_signal(&mut self, series: &BarSeries, rvol: Decimal) -> Option<SignalProposal> {
        if rvol < self.config.rvol_min || series.len() < PATTERN_BARS {
            return None;
        }

        let window = series.tail(PATTERN_BARS);
        let (base, pole, flag, breakout) = (&window[0], &window[1], &window[2..5], &window[5]);

        let pole_factor = Decimal::ONE + self.config.pole_pct / dec!(100);
        let is_pole = pole.close >= base.close * pole_factor;
        let is_flag = flag[0].high > flag[1].high && flag[1].high > flag[2].high;
        let is_breakout = breakout.close > flag[2].high;
        if !(is_pole && is_flag && is_breakout) {
            return None;
        }

        let flag_low = flag.iter().map(|b| b.low).min()?;
        SignalProposal::from_stop(
            &series.symbol,
            SignalSide::Buy,
            breakout.close,
            flag_low,
            self.config.reward_risk,
        )
    }
}
