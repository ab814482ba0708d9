//! Debt creation and merging.
//!
//! Monetary debts are always distinct records: merging them would destroy
//! the creation-date ordering that cascading allocation depends on. An
//! open inventory debt, by contrast, is a single running balance per
//! client and product - new lots are absorbed into it.

use chrono::{DateTime, Utc};
use cobro_shared::{ClientId, DebtId};
use rust_decimal::Decimal;

use super::error::DebtError;
use super::status;
use super::types::{Client, Debt, DebtKind, DebtStatus, Product};
use crate::currency::{Currency, to_base};

/// Factory for new debts and inventory merges.
pub struct DebtFactory;

impl DebtFactory {
    /// Creates a monetary debt.
    ///
    /// The CUP value is fixed at creation from the supplied rate and is
    /// never recomputed, so later rate changes cannot alter history.
    ///
    /// # Errors
    ///
    /// Returns [`DebtError::InvalidAmount`] if `amount` is not positive,
    /// or [`DebtError::InvalidRate`] if `rate` is not positive.
    pub fn new_monetary(
        client_id: ClientId,
        amount: Decimal,
        currency: Currency,
        rate: Decimal,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Debt, DebtError> {
        if amount <= Decimal::ZERO {
            return Err(DebtError::InvalidAmount(amount));
        }
        let total_cup = to_base(amount, rate)?;

        let name_snapshot = description
            .clone()
            .unwrap_or_else(|| "Monetary debt".to_string());

        let mut debt = Debt {
            id: DebtId::new(),
            client_id,
            product_id: None,
            name_snapshot,
            description,
            date: now,
            status: DebtStatus::Pending,
            payments: Vec::new(),
            kind: DebtKind::Monetary {
                original_amount: amount,
                original_currency: currency,
                exchange_rate: rate,
                total_cup,
                remaining_cup: total_cup,
            },
        };
        debt.status = status::derive(&debt);
        debt.assert_invariants();
        Ok(debt)
    }

    /// Creates an inventory debt, or merges the quantity into the client's
    /// existing open debt for the same product.
    ///
    /// No unit price is requested here: the cash value of the boxes is
    /// established lazily, at settlement time. On merge, the debt's `date`
    /// is refreshed to the merge time - the open box balance was touched
    /// by the new lot.
    ///
    /// Returns the ID of the debt that now carries the quantity.
    ///
    /// # Errors
    ///
    /// Returns [`DebtError::InvalidQuantity`] if `quantity` is not
    /// positive.
    pub fn create_or_merge_inventory(
        client: &mut Client,
        product: &Product,
        quantity: Decimal,
        now: DateTime<Utc>,
    ) -> Result<DebtId, DebtError> {
        if quantity <= Decimal::ZERO {
            return Err(DebtError::InvalidQuantity(quantity));
        }

        if let Some(idx) = client.open_inventory_debt(product.id) {
            let debt = &mut client.debts[idx];
            if let DebtKind::Inventory {
                initial_quantity,
                remaining_quantity,
                ..
            } = &mut debt.kind
            {
                *initial_quantity += quantity;
                *remaining_quantity += quantity;
            }
            debt.date = now;
            debt.status = status::derive(debt);
            debt.assert_invariants();
            return Ok(debt.id);
        }

        let mut debt = Debt {
            id: DebtId::new(),
            client_id: client.id,
            product_id: Some(product.id),
            name_snapshot: product.name.clone(),
            description: None,
            date: now,
            status: DebtStatus::Pending,
            payments: Vec::new(),
            kind: DebtKind::Inventory {
                initial_quantity: quantity,
                remaining_quantity: quantity,
                collected_cup: Decimal::ZERO,
            },
        };
        debt.status = status::derive(&debt);
        debt.assert_invariants();
        let id = debt.id;
        client.debts.push(debt);
        Ok(id)
    }
}
