//! Capital allocation logic for position sizing.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::CapitalConfig;
use crate::signals::{Signal, SignalSide};
use crate::utils::{floor_quantity, safe_div};

use super::ScanResult;

/// Suggested order for a single BUY candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub symbol: String,
    pub price: Decimal,
    /// Whole shares, always > 0
    pub quantity: u64,
    /// quantity × price
    pub trade_value: Decimal,
    pub action: SignalSide,
}

/// Splits a fixed budget across the cycle's BUY candidates.
#[derive(Debug, Clone)]
pub struct CapitalAllocator {
    config: CapitalConfig,
}

impl CapitalAllocator {
    /// Create a new capital allocator.
    pub fn new(config: CapitalConfig) -> Self {
        Self { config }
    }

    /// Allocate capital to the BUY results in scan order.
    ///
    /// At most `max_positions` candidates are considered. Each gets an equal
    /// share of the budget, lifted to `min_trade_value`, then capped by
    /// `max_trade_value` and by what is left. Candidates whose share buys no
    /// whole share are dropped, so the total never exceeds `total_capital`.
    pub fn allocate(&self, results: &[ScanResult]) -> Vec<Allocation> {
        let candidates: Vec<&ScanResult> = results
            .iter()
            .filter(|r| r.signal == Signal::Buy && r.price > Decimal::ZERO)
            .take(self.config.max_positions)
            .collect();

        if candidates.is_empty() {
            return Vec::new();
        }

        let per_trade = safe_div(self.config.total_capital, Decimal::from(candidates.len()))
            .min(self.config.max_trade_value);

        debug!(
            candidates = candidates.len(),
            total_capital = %self.config.total_capital,
            %per_trade,
            "Calculating allocation"
        );

        let mut remaining = self.config.total_capital;
        let mut allocations = Vec::with_capacity(candidates.len());

        for result in candidates {
            let budget = per_trade
                .max(self.config.min_trade_value)
                .min(self.config.max_trade_value)
                .min(remaining);

            let quantity = floor_quantity(budget, result.price);
            if quantity == 0 {
                debug!(symbol = %result.symbol, price = %result.price, %budget, "Skipped: budget buys no shares");
                continue;
            }

            let trade_value = Decimal::from(quantity) * result.price;
            remaining -= trade_value;

            allocations.push(Allocation {
                symbol: result.symbol.clone(),
                price: result.price,
                quantity,
                trade_value,
                action: SignalSide::Buy,
            });
        }

        allocations
    }
}
