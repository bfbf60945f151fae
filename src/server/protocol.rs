//! JSON frames exchanged with the live client.
//!
//! Every frame is an object tagged by `"type"`. Decimals go out as JSON numbers
//! rounded to two places; this is the only place values are rounded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, TransportError};
use crate::signals::{Signal, SignalProposal, SignalSide, StrategyKind};
use crate::strategy::{Allocation, ScanResult};
use crate::utils::round_display;

/// Inbound control frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    StrategyUpdate {
        strategy_name: String,
        #[serde(default)]
        config: serde_json::Value,
    },
}

impl ControlMessage {
    pub fn parse(text: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(text).map_err(|e| ConfigurationError::MalformedMessage(e.to_string()))
    }
}

/// Registry entry advertised at connection start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyDescriptor {
    pub name: StrategyKind,
    pub parameters: serde_json::Value,
}

/// Proposed trade attached to a `stock_update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeProposal {
    pub side: SignalSide,
    #[serde(with = "rust_decimal::serde::float")]
    pub entry: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub stop_loss: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub target: Decimal,
}

impl From<&SignalProposal> for TradeProposal {
    fn from(p: &SignalProposal) -> Self {
        Self {
            side: p.side,
            entry: round_display(p.entry),
            stop_loss: round_display(p.stop_loss),
            target: round_display(p.target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockUpdate {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pct_change: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub rvol: Decimal,
    pub signal: Signal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade: Option<TradeProposal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub float_shares: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
}

impl From<&ScanResult> for StockUpdate {
    fn from(r: &ScanResult) -> Self {
        Self {
            symbol: r.symbol.clone(),
            price: round_display(r.price),
            pct_change: round_display(r.pct_change),
            rvol: round_display(r.rvol),
            signal: r.signal,
            trade: r.proposal.as_ref().map(TradeProposal::from),
            strategy: r.strategy,
            float_shares: r.float_shares,
            headline: r.headline.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedTrade {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub trade_value: Decimal,
    pub action: SignalSide,
}

impl From<&Allocation> for SuggestedTrade {
    fn from(a: &Allocation) -> Self {
        Self {
            symbol: a.symbol.clone(),
            price: round_display(a.price),
            quantity: a.quantity,
            trade_value: round_display(a.trade_value),
            action: a.action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_capital: Decimal,
    pub suggested_trades: Vec<SuggestedTrade>,
    pub current_strategy: StrategyKind,
}

/// Outbound event frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    StrategiesList { strategies: Vec<StrategyDescriptor> },
    StrategyUpdateConfirmation { strategy: StrategyKind },
    StrategyUpdateRejected { strategy: String, error: String },
    Status { message: String },
    StockUpdate(StockUpdate),
    Summary(Summary),
}

impl ServerEvent {
    /// Every registered strategy with its default parameters.
    pub fn strategies_list() -> Self {
        ServerEvent::StrategiesList {
            strategies: StrategyKind::ALL
                .iter()
                .map(|kind| StrategyDescriptor {
                    name: *kind,
                    parameters: kind.default_parameters(),
                })
                .collect(),
        }
    }

    pub fn rejected(strategy: impl Into<String>, error: &ConfigurationError) -> Self {
        ServerEvent::StrategyUpdateRejected {
            strategy: strategy.into(),
            error: error.to_string(),
        }
    }

    /// Progress line emitted before each symbol; `position` is 1-based.
    pub fn scanning(symbol: &str, position: usize, total: usize) -> Self {
        ServerEvent::Status {
            message: format!("Scanning {symbol} ({position}/{total})"),
        }
    }

    pub fn summary(
        total_capital: Decimal,
        allocations: &[Allocation],
        current_strategy: StrategyKind,
    ) -> Self {
        ServerEvent::Summary(Summary {
            total_capital: round_display(total_capital),
            suggested_trades: allocations.iter().map(SuggestedTrade::from).collect(),
            current_strategy,
        })
    }

    pub fn to_json(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn as_value(event: &ServerEvent) -> serde_json::Value {
        serde_json::from_str(&event.to_json().unwrap()).unwrap()
    }

    fn make_result() -> ScanResult {
        ScanResult {
            symbol: "TEST".to_string(),
            price: dec!(115),
            pct_change: dec!(15),
            rvol: dec!(10),
            signal: Signal::Buy,
            proposal: None,
            strategy: None,
            float_shares: None,
            headline: None,
        }
    }

    // =========================================================================
    // Inbound Tests
    // =========================================================================

    #[test]
    fn test_parse_strategy_update() {
        let msg = ControlMessage::parse(
            r#"{"type":"strategy_update","strategy_name":"macd","config":{"fast_period":8}}"#,
        )
        .unwrap();

        assert_eq!(
            msg,
            ControlMessage::StrategyUpdate {
                strategy_name: "macd".to_string(),
                config: json!({"fast_period": 8}),
            }
        );
    }

    #[test]
    fn test_parse_without_config() {
        let msg = ControlMessage::parse(r#"{"type":"strategy_update","strategy_name":"orb"}"#).unwrap();
        let ControlMessage::StrategyUpdate { config, .. } = msg;
        assert!(config.is_null());
    }

    #[test]
    fn test_malformed_messages() {
        for text in ["not json", r#"{"type":"launch_rockets"}"#, r#"{"strategy_name":"orb"}"#] {
            assert!(
                matches!(ControlMessage::parse(text), Err(ConfigurationError::MalformedMessage(_))),
                "{text}"
            );
        }
    }

    // =========================================================================
    // Outbound Tests
    // =========================================================================

    #[test]
    fn test_stock_update_contract_fields() {
        let value = as_value(&ServerEvent::StockUpdate(StockUpdate::from(&make_result())));

        assert_eq!(
            value,
            json!({
                "type": "stock_update",
                "symbol": "TEST",
                "price": 115.0,
                "pct_change": 15.0,
                "rvol": 10.0,
                "signal": "BUY"
            })
        );
    }

    #[test]
    fn test_stock_update_rounds_and_carries_trade() {
        let mut result = make_result();
        result.rvol = dec!(3.456789);
        result.signal = Signal::Sell;
        result.strategy = Some(StrategyKind::MeanReversion);
        result.proposal = Some(SignalProposal {
            symbol: "TEST".to_string(),
            side: SignalSide::Sell,
            entry: dec!(115),
            stop_loss: dec!(118.333333),
            target: dec!(108.333334),
        });
        let value = as_value(&ServerEvent::StockUpdate(StockUpdate::from(&result)));

        assert_eq!(value["rvol"], json!(3.46));
        assert_eq!(value["signal"], json!("SELL"));
        assert_eq!(value["strategy"], json!("mean_reversion"));
        assert_eq!(
            value["trade"],
            json!({"side": "SELL", "entry": 115.0, "stop_loss": 118.33, "target": 108.33})
        );
    }

    #[test]
    fn test_summary_shape() {
        let allocations = vec![Allocation {
            symbol: "A".to_string(),
            price: dec!(50),
            quantity: 20,
            trade_value: dec!(1000),
            action: SignalSide::Buy,
        }];
        let value = as_value(&ServerEvent::summary(
            dec!(1000),
            &allocations,
            StrategyKind::OpeningRangeBreakout,
        ));

        assert_eq!(
            value,
            json!({
                "type": "summary",
                "total_capital": 1000.0,
                "suggested_trades": [
                    {"symbol": "A", "price": 50.0, "quantity": 20, "trade_value": 1000.0, "action": "BUY"}
                ],
                "current_strategy": "orb"
            })
        );
    }

    #[test]
    fn test_strategies_list_has_every_kind() {
        let value = as_value(&ServerEvent::strategies_list());
        let names: Vec<&str> = value["strategies"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();

        assert_eq!(value["type"], json!("strategies_list"));
        assert_eq!(
            names,
            vec!["orb", "mean_reversion", "macd", "vwap", "gap_and_go", "bull_flag"]
        );
        assert_eq!(value["strategies"][1]["parameters"]["window"], json!(20));
    }

    #[test]
    fn test_status_and_acknowledgements() {
        assert_eq!(
            as_value(&ServerEvent::scanning("AMD", 2, 5)),
            json!({"type": "status", "message": "Scanning AMD (2/5)"})
        );
        assert_eq!(
            as_value(&ServerEvent::StrategyUpdateConfirmation {
                strategy: StrategyKind::VwapPullback
            }),
            json!({"type": "strategy_update_confirmation", "strategy": "vwap"})
        );

        let err = ConfigurationError::UnknownStrategy("moonshot".into());
        assert_eq!(
            as_value(&ServerEvent::rejected("moonshot", &err)),
            json!({
                "type": "strategy_update_rejected",
                "strategy": "moonshot",
                "error": "Unknown strategy: moonshot"
            })
        );
    }
}
