//! Indicator math used by the strategies.
//!
//! All series are computed in `Decimal`, so cumulative sums (VWAP) carry no
//! floating-point drift regardless of series length.

use rust_decimal::Decimal;

use crate::market::Bar;
use crate::utils::{mean, sample_std};

/// Exponential moving average, recursive from the first value:
/// `ema[0] = x[0]`, `ema[t] = α·x[t] + (1 − α)·ema[t−1]`, `α = 2 / (span + 1)`.
pub fn ema(values: &[Decimal], span: usize) -> Vec<Decimal> {
    let mut out = Vec::with_capacity(values.len());
    let Some(first) = values.first() else {
        return out;
    };

    let alpha = Decimal::TWO / Decimal::from(span + 1);
    let mut prev = *first;
    out.push(prev);
    for value in &values[1..] {
        prev = alpha * value + (Decimal::ONE - alpha) * prev;
        out.push(prev);
    }
    out
}

/// MACD line and its signal line.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<Decimal>,
    pub signal: Vec<Decimal>,
}

/// `macd = ema(fast) − ema(slow)`, `signal = ema(macd, signal_span)`.
pub fn macd(closes: &[Decimal], fast: usize, slow: usize, signal_span: usize) -> Macd {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let macd: Vec<Decimal> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&macd, signal_span);
    Macd { macd, signal }
}

/// Bollinger-style bands over the trailing `window` values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub middle: Decimal,
    pub upper: Decimal,
    pub lower: Decimal,
}

/// Bands for the most recent `window` values; `None` when there are fewer.
pub fn bollinger(values: &[Decimal], window: usize, width: Decimal) -> Option<Bands> {
    if window < 2 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    let middle = mean(tail);
    let std = sample_std(tail)?;
    Some(Bands {
        middle,
        upper: middle + width * std,
        lower: middle - width * std,
    })
}

/// Cumulative volume-weighted average of the typical price, from the first bar.
///
/// A prefix with zero cumulative volume reports the bar's typical price.
pub fn vwap(bars: &[Bar]) -> Vec<Decimal> {
    let mut pv = Decimal::ZERO;
    let mut volume = Decimal::ZERO;
    bars.iter()
        .map(|bar| {
            let typical = bar.typical_price();
            pv += typical * bar.volume;
            volume += bar.volume;
            if volume.is_zero() {
                typical
            } else {
                pv / volume
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ema_constant_series() {
        let values = vec![dec!(5); 10];
        assert!(ema(&values, 3).iter().all(|v| *v == dec!(5)));
    }

    #[test]
    fn test_ema_recursion() {
        // span 3 → alpha 0.5
        let out = ema(&[dec!(2), dec!(4), dec!(8)], 3);
        assert_eq!(out, vec![dec!(2), dec!(3), dec!(5.5)]);
    }

    #[test]
    fn test_ema_empty() {
        assert!(ema(&[], 12).is_empty());
    }

    #[test]
    fn test_macd_flat_is_zero() {
        let m = macd(&[dec!(10); 30], 12, 26, 9);
        assert_eq!(m.macd.len(), 30);
        assert!(m.macd.iter().all(|v| v.is_zero()));
        assert!(m.signal.iter().all(|v| v.is_zero()));
    }

    #[test]
    fn test_bollinger_requires_window() {
        assert!(bollinger(&[dec!(1), dec!(2)], 20, dec!(2)).is_none());
    }

    #[test]
    fn test_bollinger_uses_trailing_window() {
        let mut values = vec![dec!(1000); 5];
        values.extend([dec!(1), dec!(3)]);
        let bands = bollinger(&values, 2, dec!(2)).unwrap();
        assert_eq!(bands.middle, dec!(2));
        // sample std of [1, 3] = sqrt(2)
        assert!((bands.upper - dec!(4.828427)).abs() < dec!(0.0001));
        assert!((bands.lower + dec!(0.828427)).abs() < dec!(0.0001));
    }

    fn bar(high: Decimal, low: Decimal, close: Decimal, volume: Decimal) -> Bar {
        Bar {
            timestamp: Utc::now(),
            open: close,
            high,
            low,
            close,
            volume,
        }
    }

    #[test]
    fn test_vwap_cumulative() {
        let bars = vec![
            bar(dec!(11), dec!(9), dec!(10), dec!(100)), // typical 10
            bar(dec!(21), dec!(19), dec!(20), dec!(300)), // typical 20
        ];
        let out = vwap(&bars);
        assert_eq!(out[0], dec!(10));
        // (10*100 + 20*300) / 400 = 17.5
        assert_eq!(out[1], dec!(17.5));
    }

    #[test]
    fn test_vwap_zero_volume_prefix() {
        let bars = vec![bar(dec!(11), dec!(9), dec!(10), Decimal::ZERO)];
        assert_eq!(vwap(&bars), vec![dec!(10)]);
    }
}
