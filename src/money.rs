//! Monetary amounts are `NUMERIC(10,2)` in the database and `BigDecimal` in
//! memory; every amount that leaves this program is rounded half-up to two
//! decimal places.

use bigdecimal::{BigDecimal, RoundingMode};

/// Round to two decimal places, half-up.
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Parse a positive monetary amount. Returns `None` for non-numeric input or
/// amounts that are not strictly greater than zero after rounding.
pub fn parse_money(input: &str) -> Option<BigDecimal> {
    let value: BigDecimal = input.trim().parse().ok()?;
    let value = round2(&value);
    (value > BigDecimal::from(0)).then_some(value)
}

/// Render with exactly two decimals, e.g. `120.00`.
pub fn format_money(value: &BigDecimal) -> String {
    round2(value).to_string()
}
