//! Pullback to VWAP from above.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::indicators::vwap;
use super::{
    default_reward_risk, ensure_param, parse_params, SignalProposal, SignalSide, Strategy,
    StrategyKind,
};
use crate::error::ConfigurationError;
use crate::market::BarSeries;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VwapConfig {
    #[serde(with = "rust_decimal::serde::float")]
    pub rvol_threshold: Decimal,
    /// Stop distance below the prior bar's low, as a fraction (0.002 = 0.2%)
    #[serde(with = "rust_decimal::serde::float")]
    pub stop_buffer: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward_risk: Decimal,
}

impl Default for VwapConfig {
    fn default() -> Self {
        Self {
            rvol_threshold: dec!(5),
            stop_buffer: dec!(0.002),
            reward_risk: default_reward_risk(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VwapStrategy {
    config: VwapConfig,
}

impl VwapStrategy {
    pub fn new(config: VwapConfig) -> Result<Self, ConfigurationError> {
        let kind = StrategyKind::VwapPullback;
        ensure_param(
            kind,
            config.stop_buffer >= Decimal::ZERO && config.stop_buffer < Decimal::ONE,
            "stop_buffer must be in [0, 1)",
        )?;
        ensure_param(kind, config.reward_risk > Decimal::ZERO, "reward_risk must be > 0")?;
        Ok(Self { config })
    }

    pub fn from_params(params: &serde_json::Value) -> Result<Box<dyn Strategy>, ConfigurationError> {
        let config = parse_params(StrategyKind::VwapPullback, params)?;
        Ok(Box::new(Self::new(config)?))
    }
}

impl Strategy for VwapStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::VwapPullback
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }

    fn required_bars(&self) -> usize {
        2
    }

    fn check_signal(&mut self, series: &BarSeries, rvol: Decimal) -> Option<SignalProposal> {
        if rvol < self.config.rvol_threshold {
            return None;
        }
        let (previous, latest) = (series.previous()?, series.latest()?);

        let line = vwap(series.bars());
        let n = line.len();
        let (vwap_prev, vwap_now) = (line[n - 2], line[n - 1]);

        let was_above = previous.close > vwap_prev;
        let touching = latest.low <= vwap_now && vwap_now <= latest.high;
        if !(was_above && touching) {
            return None;
        }

        // from_stop rejects a stop at or above entry
        let stop = previous.low * (Decimal::ONE - self.config.stop_buffer);
        SignalProposal::from_stop(
            &series.symbol,
            SignalSide::Buy,
            vwap_now,
            stop,
            self.config.reward_risk,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::minute_series;

    fn strategy() -> VwapStrategy {
        VwapStrategy::new(VwapConfig::default()).unwrap()
    }

    #[test]
    fn test_single_bar_fails_closed() {
        let mut s = strategy();
        let series = minute_series("V", &[(dec!(10), dec!(11), dec!(9), dec!(10), dec!(100))]);
        assert!(s.check_signal(&series, dec!(10)).is_none());
    }

    #[test]
    fn test_touch_from_above_is_buy_at_vwap() {
        let mut s = strategy();
        let series = minute_series(
            "V",
            &[
                (dec!(10), dec!(10.5), dec!(9.5), dec!(10), dec!(1000)),
                (dec!(11), dec!(12.5), dec!(10.8), dec!(12), dec!(1000)),
                (dec!(12), dec!(12), dec!(10.5), dec!(11.5), dec!(1000)),
            ],
        );
        let p = s.check_signal(&series, dec!(6)).unwrap();

        let expected_vwap = vwap(series.bars())[2];
        assert_eq!(p.side, SignalSide::Buy);
        assert_eq!(p.entry, expected_vwap);
        assert_eq!(p.stop_loss, dec!(10.7784));
        assert!(p.is_well_formed());
        assert!((p.reward() - p.risk() * dec!(2)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_rejects_non_positive_risk() {
        let mut s = strategy();
        // Prior low sits above VWAP, so the stop would be above entry
        let series = minute_series(
            "V",
            &[
                (dec!(10), dec!(10.5), dec!(9.5), dec!(10), dec!(1000)),
                (dec!(12), dec!(12.2), dec!(11.8), dec!(12), dec!(1000)),
                (dec!(12), dec!(12), dec!(10.5), dec!(11.5), dec!(1000)),
            ],
        );
        assert!(s.check_signal(&series, dec!(6)).is_none());
    }

    #[test]
    fn test_requires_rvol() {
        let mut s = strategy();
        let series = minute_series(
            "V",
            &[
                (dec!(10), dec!(10.5), dec!(9.5), dec!(10), dec!(1000)),
                (dec!(11), dec!(12.5), dec!(10.8), dec!(12), dec!(1000)),
                (dec!(12), dec!(12), dec!(10.5), dec!(11.5), dec!(1000)),
            ],
        );
        assert!(s.check_signal(&series, dec!(2)).is_none());
    }

    #[test]
    fn test_no_touch_no_signal() {
        let mut s = strategy();
        let series = minute_series(
            "V",
            &[
                (dec!(10), dec!(10.5), dec!(9.5), dec!(10), dec!(1000)),
                (dec!(11), dec!(12.5), dec!(10.8), dec!(12), dec!(1000)),
                (dec!(13), dec!(14), dec!(12.8), dec!(13.5), dec!(1000)),
            ],
        );
        assert!(s.check_signal(&series, dec!(6)).is_none());
    }
}
