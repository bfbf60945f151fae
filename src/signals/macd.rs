//! MACD / signal line bullish crossover.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::indicators::macd;
use super::{
    default_reward_risk, ensure_param, parse_params, SignalProposal, SignalSide, Strategy,
    StrategyKind,
};
use crate::error::ConfigurationError;
use crate::market::BarSeries;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacdConfig {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    /// Bars whose lowest low sets the stop
    pub stop_lookback: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub rvol_min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_risk: Decimal,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
            stop_lookback: 5,
            rvol_min: dec!(5),
            reward_risk: default_reward_risk(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MacdStrategy {
    config: MacdConfig,
}

impl MacdStrategy {
    pub fn new(config: MacdConfig) -> Result<Self, ConfigurationError> {
        let kind = StrategyKind::MacdCrossover;
        ensure_param(
            kind,
            config.fast_period >= 1 && config.fast_period < config.slow_period,
            "fast_period must be >= 1 and < slow_period",
        )?;
        ensure_param(kind, config.signal_period >= 1, "signal_period must be >= 1")?;
        ensure_param(kind, config.stop_lookback >= 1, "stop_lookback must be >= 1")?;
        ensure_param(kind, config.reward_risk > Decimal::ZERO, "reward_risk must be > 0")?;
        Ok(Self { config })
    }

    pub fn from_params(params: &serde_json::Value) -> Result<Box<dyn Strategy>, ConfigurationError> {
        let config = parse_params(StrategyKind::MacdCrossover, params)?;
        Ok(Box::new(Self::new(config)?))
    }
}

impl Strategy for MacdStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MacdCrossover
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }

    fn required_bars(&self) -> usize {
        self.config.slow_period.max(self.config.stop_lookback)
    }

    fn check_signal(&mut self, series: &BarSeries, rvol: Decimal) -> Option<SignalProposal> {
        if rvol < self.config.rvol_min || series.len() < self.required_bars() {
            return None;
        }

        let lines = macd(
            &series.closes(),
            self.config.fast_period,
            self.config.slow_period,
            self.config.signal_period,
        );
        let n = lines.macd.len();
        let (prev_macd, prev_signal) = (lines.macd[n - 2], lines.signal[n - 2]);
        let (macd_now, signal_now) = (lines.macd[n - 1], lines.signal[n - 1]);

        let crossed_up = prev_macd < prev_signal && macd_now > signal_now;
        if !crossed_up {
            return None;
        }

        let entry = series.latest()?.close;
        let stop = series
            .tail(self.config.stop_lookback)
            .iter()
            .map(|b| b.low)
            .min()?;

        SignalProposal::from_stop(
            &series.symbol,
            SignalSide::Buy,
            entry,
            stop,
            self.config.reward_risk,
        )
    }
}
