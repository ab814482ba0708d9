//! Property-based tests for the debt engine.

use chrono::Utc;
use cobro_shared::ClientId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::factory::DebtFactory;
use super::payment::{PaymentAllocator, PaymentInput};
use super::status::{self, EPSILON_CUP};
use super::types::{Client, Debt, DebtStatus, NewClient};
use crate::currency::{Currency, to_base};

/// Strategy to generate positive CUP amounts (0.01 to 1,000,000.00).
fn positive_cup() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a sequence of proposed payment amounts.
fn payment_amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((1i64..50_000_000i64).prop_map(|c| Decimal::new(c, 2)), 1..12)
}

fn cup_debt(total: Decimal) -> Debt {
    DebtFactory::new_monetary(
        ClientId::new(),
        total,
        Currency::Cup,
        Decimal::ONE,
        None,
        Utc::now(),
    )
    .unwrap()
}

fn cup_input(amount: Decimal) -> PaymentInput {
    PaymentInput {
        amount,
        currency: Currency::Cup,
        exchange_rate: Decimal::ONE,
        price_per_unit: None,
        note: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Conservation: for any sequence of accepted targeted payments,
    /// `total - remaining == sum of recorded payments` within tolerance,
    /// at every point.
    #[test]
    fn prop_targeted_payments_conserve_value(
        total in positive_cup(),
        amounts in payment_amounts(),
    ) {
        let mut debt = cup_debt(total);

        for amount in amounts {
            // Invalid proposals must leave the debt untouched
            let before = debt.clone();
            if PaymentAllocator::pay_debt(&mut debt, &cup_input(amount), Utc::now()).is_err() {
                prop_assert_eq!(&debt, &before);
            }

            let paid: Decimal = debt.payments.iter().map(|p| p.amount_paid_cup).sum();
            let remaining = debt.remaining_metric();
            prop_assert!(remaining >= Decimal::ZERO);
            prop_assert!(remaining <= total);
            prop_assert!(
                (total - remaining - paid).abs() <= EPSILON_CUP,
                "conservation broken: total {} remaining {} paid {}",
                total, remaining, paid
            );
        }
    }

    /// Status correctness: Paid exactly when the remaining metric is
    /// within tolerance of zero; a debt with no payments is Pending.
    #[test]
    fn prop_status_matches_remaining(
        total in positive_cup(),
        amounts in payment_amounts(),
    ) {
        let mut debt = cup_debt(total);
        prop_assert_eq!(debt.status, status::derive(&debt));
        if debt.payments.is_empty() && debt.remaining_metric() > EPSILON_CUP {
            prop_assert_eq!(debt.status, DebtStatus::Pending);
        }

        for amount in amounts {
            let _ = PaymentAllocator::pay_debt(&mut debt, &cup_input(amount), Utc::now());
            let paid_off = debt.remaining_metric() <= EPSILON_CUP;
            prop_assert_eq!(debt.status == DebtStatus::Paid, paid_off);
        }
    }

    /// Cascade conservation: distributed + unallocated always equals the
    /// normalized lump, and no debt ends up outside its [0, total] bounds.
    #[test]
    fn prop_cascade_accounts_for_every_cent(
        totals in prop::collection::vec(positive_cup(), 0..6),
        lump in positive_cup(),
    ) {
        let mut client = Client::new(NewClient::default());
        for total in &totals {
            client.debts.push(cup_debt(*total));
        }

        let outcome = PaymentAllocator::allocate_lump(
            &mut client,
            lump,
            Currency::Cup,
            Decimal::ONE,
            Utc::now(),
        )
        .unwrap();

        let normalized = to_base(lump, Decimal::ONE).unwrap();
        prop_assert_eq!(
            outcome.distributed_cup + outcome.unallocated_cup,
            normalized,
            "lump not fully accounted for"
        );

        for debt in &client.debts {
            let remaining = debt.remaining_metric();
            prop_assert!(remaining >= Decimal::ZERO);
            prop_assert!(remaining <= debt.initial_metric());
            prop_assert_eq!(debt.status == DebtStatus::Paid, remaining <= EPSILON_CUP);
        }
    }

    /// The cascade services debts strictly oldest-first: a newer debt is
    /// only touched once every older debt is fully paid.
    #[test]
    fn prop_cascade_is_fifo(
        totals in prop::collection::vec(positive_cup(), 1..6),
        lump in positive_cup(),
    ) {
        let mut client = Client::new(NewClient::default());
        let base = Utc::now();
        for (i, total) in totals.iter().enumerate() {
            let mut debt = cup_debt(*total);
            debt.date = base + chrono::TimeDelta::days(i as i64);
            client.debts.push(debt);
        }

        PaymentAllocator::allocate_lump(
            &mut client,
            lump,
            Currency::Cup,
            Decimal::ONE,
            Utc::now(),
        )
        .unwrap();

        // Once an open debt is reached, nothing newer may have been paid
        let mut seen_open = false;
        for debt in client.debts.iter() {
            if seen_open {
                prop_assert!(
                    debt.payments.is_empty(),
                    "a newer debt was paid before an older one was settled"
                );
            }
            if debt.status != DebtStatus::Paid {
                seen_open = true;
            }
        }
    }
}
