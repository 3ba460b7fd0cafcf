//! Commission amounts and decimal conversion.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// Converts a float into a decimal through its shortest round-trip
/// representation, so `0.1` becomes exactly `0.1`.
///
/// Falls back to the binary expansion when the shortest form does not fit
/// the decimal's 28-digit scale.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
}

/// A commission in the reference currency.
///
/// Always a non-negative multiple of 0.01: the only constructor ceils to the
/// next cent so that commission is never under-collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Commission(Decimal);

impl Commission {
    /// Rounds a raw commission up to the next cent.
    ///
    /// A value that already is a whole number of cents is returned unchanged.
    pub fn ceil_to_cent(raw: Decimal) -> Self {
        let cents = raw.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity);
        Self(cents.normalize().max(Decimal::ZERO))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Commission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exact_cent_is_unchanged() {
        assert_eq!(Commission::ceil_to_cent(dec!(1.50)).as_decimal(), dec!(1.5));
        assert_eq!(Commission::ceil_to_cent(dec!(1.5000)).to_string(), "1.50");
    }

    #[test]
    fn test_fraction_of_a_cent_rounds_up() {
        assert_eq!(Commission::ceil_to_cent(dec!(1.501)).to_string(), "1.51");
        assert_eq!(Commission::ceil_to_cent(dec!(0.0001)).to_string(), "0.01");
        assert_eq!(
            Commission::ceil_to_cent(dec!(0.909090909090909)).to_string(),
            "0.91"
        );
    }

    #[test]
    fn test_zero_commission() {
        let zero = Commission::ceil_to_cent(Decimal::ZERO);
        assert_eq!(zero.to_string(), "0.00");
        assert_eq!(zero.to_f64(), 0.0);
    }

    #[test]
    fn test_decimal_from_f64_uses_shortest_form() {
        assert_eq!(decimal_from_f64(0.1), Some(dec!(0.1)));
        assert_eq!(decimal_from_f64(1.1), Some(dec!(1.1)));
        assert_eq!(decimal_from_f64(100.0), Some(dec!(100)));
        assert_eq!(decimal_from_f64(f64::NAN), None);
    }

    #[test]
    fn test_float_scaling_error_does_not_leak() {
        // 1.1 * 100 is 110.00000000000001 in binary floating point.
        let raw = decimal_from_f64(1.1).unwrap();
        assert_eq!(Commission::ceil_to_cent(raw).to_string(), "1.10");
    }
}
