//! Decimal helpers for amounts, weights and ratios.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `price * quantity` rounded to cents, when both are known.
pub fn line_total(price: Option<Decimal>, quantity: Option<Decimal>) -> Option<Decimal> {
    match (price, quantity) {
        (Some(p), Some(q)) => Some(round_money(p * q)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(d("1.005")), d("1.01"));
        assert_eq!(round_money(d("2.344")), d("2.34"));
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Some(d("9200")), Some(d("31.25"))), Some(d("287500.00")));
        assert_eq!(line_total(None, Some(d("1"))), None);
        assert_eq!(line_total(Some(d("1")), None), None);
    }
}
