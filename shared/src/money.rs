//! Money arithmetic
//!
//! Amounts are `Decimal` with exactly two fractional digits. Every stored
//! total goes through [`to_money`] so repeated additions never drift.

use rust_decimal::{Decimal, RoundingStrategy};

pub const MONEY_SCALE: u32 = 2;

/// Round half-up to two decimals and pin the scale ("50" → "50.00")
pub fn to_money(value: Decimal) -> Decimal {
    let mut v = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    v.rescale(MONEY_SCALE);
    v
}

/// `unit_price × quantity`
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    to_money(unit_price * Decimal::from(quantity))
}

/// Add one line to a running total
pub fn add_line(total: Decimal, unit_price: Decimal, quantity: i32) -> Decimal {
    to_money(total + line_total(unit_price, quantity))
}

/// Whether a price is acceptable for a menu item or order line
pub fn is_valid_price(value: Decimal) -> bool {
    !value.is_sign_negative()
}
