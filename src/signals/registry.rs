//! Static strategy registry.
//!
//! Maps a fixed set of strategy identifiers to constructors. Unknown names are
//! a [`ConfigurationError`], never a runtime lookup failure.

use serde::Serialize;
use std::fmt;

use super::{
    BullFlagStrategy, GapAndGoStrategy, MacdStrategy, MeanReversionStrategy, OrbStrategy,
    Strategy, VwapStrategy,
};
use crate::error::ConfigurationError;

type Constructor = fn(&serde_json::Value) -> Result<Box<dyn Strategy>, ConfigurationError>;

/// Every strategy family the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[serde(rename = "orb")]
    OpeningRangeBreakout,
    MeanReversion,
    #[serde(rename = "macd")]
    MacdCrossover,
    #[serde(rename = "vwap")]
    VwapPullback,
    GapAndGo,
    BullFlag,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::OpeningRangeBreakout,
        StrategyKind::MeanReversion,
        StrategyKind::MacdCrossover,
        StrategyKind::VwapPullback,
        StrategyKind::GapAndGo,
        StrategyKind::BullFlag,
    ];

    /// Canonical registry name.
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::OpeningRangeBreakout => "orb",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::MacdCrossover => "macd",
            StrategyKind::VwapPullback => "vwap",
            StrategyKind::GapAndGo => "gap_and_go",
            StrategyKind::BullFlag => "bull_flag",
        }
    }

    /// Resolve a canonical name or alias (case-insensitive, `-` treated as `_`).
    pub fn from_name(name: &str) -> Result<Self, ConfigurationError> {
        let normalized = name.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "orb" | "opening_range_breakout" => Ok(StrategyKind::OpeningRangeBreakout),
            "mean_reversion" => Ok(StrategyKind::MeanReversion),
            "macd" | "macd_crossover" => Ok(StrategyKind::MacdCrossover),
            "vwap" | "vwap_pullback" => Ok(StrategyKind::VwapPullback),
            "gap_and_go" => Ok(StrategyKind::GapAndGo),
            "bull_flag" => Ok(StrategyKind::BullFlag),
            _ => Err(ConfigurationError::UnknownStrategy(name.to_string())),
        }
    }

    /// Families that read session structure (opening window, first candle)
    /// and stay silent on one-bar-per-day series.
    pub fn needs_intraday_bars(self) -> bool {
        matches!(
            self,
            StrategyKind::OpeningRangeBreakout | StrategyKind::GapAndGo
        )
    }

    fn constructor(self) -> Constructor {
        match self {
            StrategyKind::OpeningRangeBreakout => OrbStrategy::from_params,
            StrategyKind::MeanReversion => MeanReversionStrategy::from_params,
            StrategyKind::MacdCrossover => MacdStrategy::from_params,
            StrategyKind::VwapPullback => VwapStrategy::from_params,
            StrategyKind::GapAndGo => GapAndGoStrategy::from_params,
            StrategyKind::BullFlag => BullFlagStrategy::from_params,
        }
    }

    /// Construct a fresh instance with the given parameter mapping.
    pub fn build(self, params: &serde_json::Value) -> Result<Box<dyn Strategy>, ConfigurationError> {
        (self.constructor())(params)
    }

    /// Parameters of a default-configured instance.
    pub fn default_parameters(self) -> serde_json::Value {
        self.build(&serde_json::Value::Null)
            .map(|s| s.parameters())
            .unwrap_or_default()
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up `name` in the registry and build it with `params`.
pub fn create_strategy(
    name: &str,
    params: &serde_json::Value,
) -> Result<Box<dyn Strategy>, ConfigurationError> {
    StrategyKind::from_name(name)?.build(params)
}
