//! Decimal arithmetic utilities for price and volume calculations.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

/// Decimal places used when reporting prices and values.
pub const DISPLAY_PRECISION: u32 = 2;

/// Round a decimal to a specific number of decimal places.
pub fn round_to_precision(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp(decimals)
}

/// Round to the reporting precision (2 dp).
pub fn round_display(value: Decimal) -> Decimal {
    round_to_precision(value, DISPLAY_PRECISION)
}

/// Safe division that returns zero if divisor is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator == Decimal::ZERO {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Percent change from `base` to `value` (15 = +15%).
pub fn percent_change(value: Decimal, base: Decimal) -> Decimal {
    safe_div(value - base, base) * dec!(100)
}

/// Whole units purchasable with `capital` at `price`, rounded down.
pub fn floor_quantity(capital: Decimal, price: Decimal) -> u64 {
    if price <= Decimal::ZERO || capital <= Decimal::ZERO {
        return 0;
    }
    (capital / price).floor().to_u64().unwrap_or(0)
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values);
    let sum_sq: Decimal = values.iter().map(|v| (*v - avg) * (*v - avg)).sum();
    (sum_sq / Decimal::from(values.len() - 1)).sqrt()
}
