//! Fixed-point amount helpers.
//!
//! CRITICAL: Never use floating-point for money or stock calculations.
//! Every amount in the system is a `rust_decimal::Decimal`, quantized to a
//! fixed number of decimal places at the point it enters the system.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places for stock quantities (base units).
pub const QUANTITY_SCALE: u32 = 3;

/// Quantizes a monetary amount to 2 decimal places.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Quantizes a stock quantity to 3 decimal places.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
#[must_use]
pub fn round_quantity(quantity: Decimal) -> Decimal {
    quantity.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointNearestEven)
}
