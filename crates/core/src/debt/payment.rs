//! Payment validation and allocation.
//!
//! Two payment modes exist and they are deliberately distinct operations:
//! a targeted payment settles one specific debt, while cascading
//! allocation spreads one lump sum across a client's open monetary debts,
//! oldest first. Both validate fully before mutating anything, so a
//! rejected payment leaves every debt untouched.

use chrono::{DateTime, Utc};
use cobro_shared::PaymentId;
use rust_decimal::Decimal;

use super::error::DebtError;
use super::status::{self, EPSILON_CUP, EPSILON_QTY};
use super::types::{Client, Debt, DebtKind, Payment};
use crate::currency::{BASE_DECIMAL_PLACES, Currency, round, to_base};

/// Input for a targeted payment against one specific debt.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// The amount tendered, in `currency`.
    pub amount: Decimal,
    /// The currency the client is paying with.
    pub currency: Currency,
    /// CUP per one unit of `currency`, as agreed for this payment.
    pub exchange_rate: Decimal,
    /// Unit price in the tendered currency. Required to settle inventory
    /// debts (it converts money into boxes); ignored for monetary debts.
    pub price_per_unit: Option<Decimal>,
    /// Optional free-text note.
    pub note: Option<String>,
}

/// How a validated payment will affect its target debt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentBreakdown {
    /// The tendered amount normalized into CUP.
    pub paid_cup: Decimal,
    /// Boxes covered, for inventory settlements.
    pub quantity_reduced: Option<Decimal>,
}

/// Checks a proposed payment against its target debt before any mutation.
pub struct PaymentValidator;

impl PaymentValidator {
    /// Validates a targeted payment and computes its effect.
    ///
    /// # Errors
    ///
    /// - [`DebtError::InvalidAmount`] if the amount is not positive
    /// - [`DebtError::InvalidRate`] if the rate is not positive
    /// - [`DebtError::InvalidUnitPrice`] if an inventory settlement has no
    ///   positive unit price
    /// - [`DebtError::Overpayment`] if the payment exceeds what is owed,
    ///   beyond the per-metric tolerance
    pub fn validate_targeted(
        debt: &Debt,
        input: &PaymentInput,
    ) -> Result<PaymentBreakdown, DebtError> {
        if input.amount <= Decimal::ZERO {
            return Err(DebtError::InvalidAmount(input.amount));
        }
        let paid_cup = to_base(input.amount, input.exchange_rate)?;

        match &debt.kind {
            DebtKind::Monetary { remaining_cup, .. } => {
                // A settled debt accepts no further payments, however small:
                // tolerance-sized amounts would otherwise pile onto the
                // payment history without reducing anything.
                if !debt.status.is_open() || paid_cup > *remaining_cup + EPSILON_CUP {
                    return Err(DebtError::Overpayment {
                        attempted: paid_cup,
                        remaining: *remaining_cup,
                    });
                }
                Ok(PaymentBreakdown {
                    paid_cup,
                    quantity_reduced: None,
                })
            }
            DebtKind::Inventory {
                remaining_quantity, ..
            } => {
                let price = input.price_per_unit.unwrap_or(Decimal::ZERO);
                if price <= Decimal::ZERO {
                    return Err(DebtError::InvalidUnitPrice(price));
                }
                let quantity = round(input.amount / price, BASE_DECIMAL_PLACES);
                if !debt.status.is_open() || quantity > *remaining_quantity + EPSILON_QTY {
                    return Err(DebtError::Overpayment {
                        attempted: quantity,
                        remaining: *remaining_quantity,
                    });
                }
                Ok(PaymentBreakdown {
                    paid_cup,
                    quantity_reduced: Some(quantity),
                })
            }
        }
    }
}

/// Outcome of a cascading allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    /// Payments recorded, in application order (oldest debt first).
    pub payments: Vec<Payment>,
    /// CUP actually applied to debts.
    pub distributed_cup: Decimal,
    /// CUP left over after every open monetary debt was serviced.
    /// Surfaced to the caller; the engine neither keeps it nor refunds it.
    pub unallocated_cup: Decimal,
}

/// Applies validated payments and mutates debts.
pub struct PaymentAllocator;

impl PaymentAllocator {
    /// Applies a targeted payment to one debt and returns the recorded
    /// payment.
    ///
    /// # Errors
    ///
    /// Propagates every [`PaymentValidator::validate_targeted`] failure;
    /// the debt is untouched on error.
    pub fn pay_debt(
        debt: &mut Debt,
        input: &PaymentInput,
        now: DateTime<Utc>,
    ) -> Result<Payment, DebtError> {
        let breakdown = PaymentValidator::validate_targeted(debt, input)?;

        let payment = Payment {
            id: PaymentId::new(),
            debt_id: debt.id,
            amount_paid_original: input.amount,
            currency: input.currency,
            exchange_rate: input.exchange_rate,
            amount_paid_cup: breakdown.paid_cup,
            quantity_paid: breakdown.quantity_reduced,
            date: now,
            note: input.note.clone(),
        };
        Self::apply(debt, &payment);
        Ok(payment)
    }

    /// Distributes one lump payment across the client's open monetary
    /// debts, oldest first, until the money or the debts run out.
    ///
    /// Inventory debts are never touched. Whatever cannot be allocated is
    /// reported back in [`CascadeOutcome::unallocated_cup`].
    ///
    /// # Errors
    ///
    /// Returns [`DebtError::InvalidAmount`] or [`DebtError::InvalidRate`]
    /// before anything is mutated.
    pub fn allocate_lump(
        client: &mut Client,
        amount: Decimal,
        currency: Currency,
        rate: Decimal,
        now: DateTime<Utc>,
    ) -> Result<CascadeOutcome, DebtError> {
        if amount <= Decimal::ZERO {
            return Err(DebtError::InvalidAmount(amount));
        }
        let mut to_distribute = to_base(amount, rate)?;

        // Oldest debt first (FIFO by creation date)
        let mut order: Vec<usize> = client
            .debts
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_monetary() && d.status.is_open())
            .map(|(i, _)| i)
            .collect();
        order.sort_by_key(|&i| client.debts[i].date);

        let mut payments = Vec::new();
        for idx in order {
            if to_distribute <= EPSILON_CUP {
                break;
            }
            let debt = &mut client.debts[idx];
            let portion = to_distribute.min(debt.remaining_metric());
            if portion <= Decimal::ZERO {
                continue;
            }

            let payment = Payment {
                id: PaymentId::new(),
                debt_id: debt.id,
                // recorded in the tendered currency, as the client paid it
                amount_paid_original: round(portion / rate, BASE_DECIMAL_PLACES),
                currency,
                exchange_rate: rate,
                amount_paid_cup: portion,
                quantity_paid: None,
                date: now,
                note: None,
            };
            Self::apply(debt, &payment);
            payments.push(payment);
            to_distribute -= portion;
        }

        let distributed_cup = payments.iter().map(|p| p.amount_paid_cup).sum();
        Ok(CascadeOutcome {
            payments,
            distributed_cup,
            unallocated_cup: to_distribute.max(Decimal::ZERO),
        })
    }

    /// Applies a validated payment: reduces the remaining metric (floored
    /// at zero), appends the payment, and re-derives status.
    fn apply(debt: &mut Debt, payment: &Payment) {
        match &mut debt.kind {
            DebtKind::Monetary { remaining_cup, .. } => {
                *remaining_cup = (*remaining_cup - payment.amount_paid_cup).max(Decimal::ZERO);
            }
            DebtKind::Inventory {
                remaining_quantity,
                collected_cup,
                ..
            } => {
                if let Some(quantity) = payment.quantity_paid {
                    *remaining_quantity = (*remaining_quantity - quantity).max(Decimal::ZERO);
                }
                *collected_cup += payment.amount_paid_cup;
            }
        }
        debt.payments.push(payment.clone());
        debt.status = status::derive(debt);
        debt.assert_invariants();
    }
}
