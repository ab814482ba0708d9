//! Property-based tests for currency conversion.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::conversion::{round, to_base};

/// Strategy to generate positive decimal amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy to generate non-positive rates.
fn non_positive_rate() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|v| -Decimal::new(v, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Conversion is deterministic and side-effect-free: calling it twice
    /// with identical inputs yields identical output.
    #[test]
    fn prop_to_base_is_deterministic(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let result1 = to_base(amount, rate).unwrap();
        let result2 = to_base(amount, rate).unwrap();
        prop_assert_eq!(result1, result2, "Conversion should be deterministic");
    }

    /// Converted amounts never carry more than 4 decimal places.
    #[test]
    fn prop_to_base_rounds_to_4_decimals(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let result = to_base(amount, rate).unwrap();
        let scaled = result * Decimal::from(10000);
        prop_assert_eq!(
            scaled,
            scaled.round(),
            "Result {} should have at most 4 decimal places",
            result
        );
    }

    /// Positive amount and positive rate always produce a positive result.
    #[test]
    fn prop_positive_inputs_positive_output(
        amount in positive_amount(),
        rate in positive_rate(),
    ) {
        let result = to_base(amount, rate).unwrap();
        prop_assert!(result > Decimal::ZERO, "Result should be positive");
    }

    /// Converting with rate = 1 preserves the amount (rounded to 4 decimals).
    #[test]
    fn prop_base_rate_preserves_amount(
        amount in positive_amount(),
    ) {
        let result = to_base(amount, Decimal::ONE).unwrap();
        prop_assert_eq!(result, round(amount, 4));
    }

    /// Any non-positive rate is rejected, for any amount.
    #[test]
    fn prop_non_positive_rate_rejected(
        amount in positive_amount(),
        rate in non_positive_rate(),
    ) {
        prop_assert!(to_base(amount, rate).is_err());
    }
}
