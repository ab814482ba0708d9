//! Debt status derivation.
//!
//! Status is a pure function of a debt's remaining metric and payment
//! history. It is recomputed after every mutation and never stored as
//! independently-editable state anywhere else.

use rust_decimal::Decimal;

use super::types::{Debt, DebtKind, DebtStatus};

/// Absolute tolerance for treating a remaining CUP balance as settled:
/// one cent. Absorbs rounding introduced by cross-currency payments.
pub const EPSILON_CUP: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Absolute tolerance for treating a remaining quantity as settled:
/// one hundredth of a box. Settlement divides money by a unit price, so
/// quantities are rarely whole.
pub const EPSILON_QTY: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// The tolerance that applies to a debt's own metric.
#[must_use]
pub fn epsilon_for(debt: &Debt) -> Decimal {
    match debt.kind {
        DebtKind::Monetary { .. } => EPSILON_CUP,
        DebtKind::Inventory { .. } => EPSILON_QTY,
    }
}

/// Derives the lifecycle state of a debt.
///
/// - `Paid` once the remaining metric is within tolerance of zero
/// - `Pending` while no payment has ever reduced the debt
/// - `Partial` otherwise
#[must_use]
pub fn derive(debt: &Debt) -> DebtStatus {
    if debt.remaining_metric() <= epsilon_for(debt) {
        return DebtStatus::Paid;
    }
    if debt.payments.is_empty() {
        return DebtStatus::Pending;
    }
    DebtStatus::Partial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use chrono::Utc;
    use cobro_shared::{ClientId, DebtId, PaymentId};
    use rust_decimal_macros::dec;

    fn monetary(total: Decimal, remaining: Decimal) -> Debt {
        Debt {
            id: DebtId::new(),
            client_id: ClientId::new(),
            product_id: None,
            name_snapshot: "Loan".to_string(),
            description: None,
            date: Utc::now(),
            status: DebtStatus::Pending,
            payments: Vec::new(),
            kind: DebtKind::Monetary {
                original_amount: total,
                original_currency: Currency::Cup,
                exchange_rate: Decimal::ONE,
                total_cup: total,
                remaining_cup: remaining,
            },
        }
    }

    fn dummy_payment(debt: &Debt, cup: Decimal) -> super::super::types::Payment {
        super::super::types::Payment {
            id: PaymentId::new(),
            debt_id: debt.id,
            amount_paid_original: cup,
            currency: Currency::Cup,
            exchange_rate: Decimal::ONE,
            amount_paid_cup: cup,
            quantity_paid: None,
            date: Utc::now(),
            note: None,
        }
    }

    #[test]
    fn test_fresh_debt_is_pending() {
        let debt = monetary(dec!(100), dec!(100));
        assert_eq!(derive(&debt), DebtStatus::Pending);
    }

    #[test]
    fn test_partially_paid_debt_is_partial() {
        let mut debt = monetary(dec!(100), dec!(60));
        debt.payments.push(dummy_payment(&debt, dec!(40)));
        assert_eq!(derive(&debt), DebtStatus::Partial);
    }

    #[test]
    fn test_zero_remaining_is_paid() {
        let mut debt = monetary(dec!(100), Decimal::ZERO);
        debt.payments.push(dummy_payment(&debt, dec!(100)));
        assert_eq!(derive(&debt), DebtStatus::Paid);
    }

    #[test]
    fn test_remaining_within_epsilon_is_paid() {
        let mut debt = monetary(dec!(100), dec!(0.01));
        debt.payments.push(dummy_payment(&debt, dec!(99.99)));
        assert_eq!(derive(&debt), DebtStatus::Paid);
    }

    #[test]
    fn test_remaining_just_above_epsilon_stays_partial() {
        let mut debt = monetary(dec!(100), dec!(0.02));
        debt.payments.push(dummy_payment(&debt, dec!(99.98)));
        assert_eq!(derive(&debt), DebtStatus::Partial);
    }

    #[test]
    fn test_epsilon_constants() {
        assert_eq!(EPSILON_CUP, dec!(0.01));
        assert_eq!(EPSILON_QTY, dec!(0.01));
    }
}
