//! Shared utilities.

pub mod decimal;

pub use decimal::{
    floor_quantity, mean, percent_change, round_display, round_to_precision, safe_div,
    sample_std, DISPLAY_PRECISION,
};
