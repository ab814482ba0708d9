//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round converted amounts to [`BASE_DECIMAL_PLACES`]
//! - Use banker's rounding (round half to even)
//! - Store both original and converted amounts
//!
//! The converter holds no state and performs no lookups: the rate is always
//! supplied by the caller (a configured default or a user override). This
//! keeps historical conversions reproducible even if default rates change
//! later.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use thiserror::Error;

/// Decimal places kept on amounts normalized into the base unit.
pub const BASE_DECIMAL_PLACES: u32 = 4;

/// A conversion was attempted with a non-positive exchange rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("exchange rate must be positive, got {0}")]
pub struct InvalidRate(pub Decimal);

/// Converts an amount in a foreign unit into the base unit.
///
/// Uses banker's rounding (round half to even) to minimize cumulative
/// errors.
///
/// # Errors
///
/// Returns [`InvalidRate`] if `rate` is zero or negative.
pub fn to_base(amount: Decimal, rate: Decimal) -> Result<Decimal, InvalidRate> {
    if rate <= Decimal::ZERO {
        return Err(InvalidRate(rate));
    }
    Ok(round(amount * rate, BASE_DECIMAL_PLACES))
}

/// Rounds a value using banker's rounding (round half to even).
#[must_use]
pub fn round(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_base() {
        // 100 USD * 320 = 32,000 CUP
        let result = to_base(dec!(100), dec!(320)).unwrap();
        assert_eq!(result, dec!(32000));
    }

    #[test]
    fn test_to_base_same_unit() {
        // Base unit: rate = 1, result = amount
        let result = to_base(dec!(100.50), Decimal::ONE).unwrap();
        assert_eq!(result, dec!(100.50));
    }

    #[test]
    fn test_to_base_rounds_to_4_decimals() {
        // 100 * 1.23456789 = 123.456789 -> rounds to 123.4568
        let result = to_base(dec!(100), dec!(1.23456789)).unwrap();
        assert_eq!(result, dec!(123.4568));
    }

    #[test]
    fn test_to_base_rejects_zero_rate() {
        assert_eq!(
            to_base(dec!(100), Decimal::ZERO),
            Err(InvalidRate(Decimal::ZERO))
        );
    }

    #[test]
    fn test_to_base_rejects_negative_rate() {
        assert_eq!(to_base(dec!(100), dec!(-320)), Err(InvalidRate(dec!(-320))));
    }

    #[test]
    fn test_bankers_rounding() {
        // Test banker's rounding (round half to even)
        // 2.5 rounds to 2, 3.5 rounds to 4
        assert_eq!(round(dec!(2.5), 0), dec!(2));
        assert_eq!(round(dec!(3.5), 0), dec!(4));

        // 2.25 -> 2.2, 2.35 -> 2.4 at 1 decimal
        assert_eq!(round(dec!(2.25), 1), dec!(2.2));
        assert_eq!(round(dec!(2.35), 1), dec!(2.4));
    }
}
