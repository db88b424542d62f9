//! Shared utilities for the treasury workspace.

use alloy::primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimals shared by TRX, WTRX and the paired TRC-20 token (1 TRX = 1_000_000 sun).
pub const TRX_DECIMALS: u32 = 6;

/// Converts a smallest-unit amount into a `Decimal`, accounting for token decimals.
///
/// Returns `None` when the value does not fit the 96-bit decimal mantissa.
pub fn to_decimal(value: U256, decimals: u32) -> Option<Decimal> {
    if value.bit_len() > 96 {
        return None;
    }
    Decimal::try_from_i128_with_scale(value.to::<u128>() as i128, decimals).ok()
}

/// Converts a decimal amount into smallest units, rounding half away from zero.
///
/// Returns `None` for negative amounts or on overflow.
pub fn to_smallest_units(amount: Decimal, decimals: u32) -> Option<U256> {
    if amount < Decimal::ZERO {
        return None;
    }
    let factor = Decimal::from(10_u64.checked_pow(decimals)?);
    amount
        .checked_mul(factor)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
        .map(U256::from)
}

/// Formats a decimal with exactly `places` fractional digits, rounding half away from zero.
pub fn format_decimal(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}

/// Formats a smallest-unit amount for display, e.g. `1_234_567` sun -> `"1.23"`.
///
/// Values too large for `Decimal` are rounded in integer arithmetic instead.
pub fn format_units(value: U256, decimals: u32, places: u32) -> String {
    match to_decimal(value, decimals) {
        Some(amount) => format_decimal(amount, places),
        None => format_wide_units(value, decimals, places),
    }
}

fn format_wide_units(value: U256, decimals: u32, places: u32) -> String {
    let ten = U256::from(10u64);
    let scaled = if places < decimals {
        let step = ten.pow(U256::from(decimals - places));
        value.saturating_add(step / U256::from(2u64)) / step
    } else {
        value.saturating_mul(ten.pow(U256::from(places - decimals)))
    };
    if places == 0 {
        return scaled.to_string();
    }
    let (integer, frac) = scaled.div_rem(ten.pow(U256::from(places)));
    format!("{integer}.{:0>width$}", frac.to_string(), width = places as usize)
}
