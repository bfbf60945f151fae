//! Bollinger band mean reversion.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::indicators::bollinger;
use super::{
    default_reward_risk, ensure_param, parse_params, SignalProposal, SignalSide, Strategy,
    StrategyKind,
};
use crate::error::ConfigurationError;
use crate::market::BarSeries;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeanReversionConfig {
    /// Rolling window for mean and standard deviation
    pub window: usize,
    /// Band width in standard deviations
    #[serde(with = "rust_decimal::serde::float")]
    pub std_dev: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rvol_min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_risk: Decimal,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            window: 20,
            std_dev: dec!(2),
            rvol_min: dec!(5),
            reward_risk: default_reward_risk(),
        }
    }
}

/// Fades closes outside the bands back toward the rolling mean.
#[derive(Debug, Clone)]
pub struct MeanReversionStrategy {
    config: MeanReversionConfig,
}

impl MeanReversionStrategy {
    pub fn new(config: MeanReversionConfig) -> Result<Self, ConfigurationError> {
        let kind = StrategyKind::MeanReversion;
        ensure_param(kind, config.window >= 2, "window must be >= 2")?;
        ensure_param(kind, config.std_dev > Decimal::ZERO, "std_dev must be > 0")?;
        ensure_param(kind, config.reward_risk > Decimal::ZERO, "reward_risk must be > 0")?;
        Ok(Self { config })
    }

    pub fn from_params(params: &serde_json::Value) -> Result<Box<dyn Strategy>, ConfigurationError> {
        let config = parse_params(StrategyKind::MeanReversion, params)?;
        Ok(Box::new(Self::new(config)?))
    }
}

impl Strategy for MeanReversionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MeanReversion
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }

    fn required_bars(&self) -> usize {
        self.config.window
    }

    fn check_signal(&mut self, series: &BarSeries, rvol: Decimal) -> Option<SignalProposal> {
        if rvol < self.config.rvol_min {
            return None;
        }

        let bands = bollinger(&series.closes(), self.config.window, self.config.std_dev)?;
        let close = series.latest()?.close;

        // Target is the mean; the stop sits at reward / ratio on the far side.
        let side = if close < bands.lower {
            SignalSide::Buy
        } else if close > bands.upper {
            SignalSide::Sell
        } else {
            return None;
        };

        SignalProposal::from_target(
            &series.symbol,
            side,
            close,
            bands.middle,
            self.config.reward_risk,
        )
    }
}
