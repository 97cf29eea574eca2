//! Fixed-precision arithmetic for stock quantities and currency amounts
//!
//! Quantities are rounded to 3 decimal places after every add/subtract so
//! repeated allocation cycles cannot drift; currency lines round to 2
//! places. Sufficiency comparisons use a half-step tolerance so rounding
//! noise never produces a false "insufficient stock".

use rust_decimal::{Decimal, RoundingStrategy};

/// Quantities carry 3 fractional digits (continuous, weight-style stock).
pub const QUANTITY_SCALE: u32 = 3;

/// Currency amounts carry 2 fractional digits.
pub const CURRENCY_SCALE: u32 = 2;

/// Weighted average unit cost is reported at 4 fractional digits.
pub const AVG_COST_SCALE: u32 = 4;

/// Half of the smallest representable quantity step (0.0005)
pub const QUANTITY_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 4);

/// Round a quantity to the canonical 3-decimal scale.
#[inline]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a currency amount to the canonical 2-decimal scale.
#[inline]
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a weighted average unit cost to 4 decimal places.
#[inline]
pub fn round_avg_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AVG_COST_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether `remaining` can satisfy `requested` within tolerance.
#[inline]
pub fn is_sufficient(remaining: Decimal, requested: Decimal) -> bool {
    remaining + QUANTITY_TOLERANCE >= requested
}

/// A quantity at or below tolerance counts as fully depleted.
#[inline]
pub fn is_depleted(value: Decimal) -> bool {
    value <= QUANTITY_TOLERANCE
}
