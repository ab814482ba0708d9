//! Debt domain types.
//!
//! A [`Debt`] is one obligation a client owes: either money or goods,
//! never both at once. The two shapes are a closed tagged variant
//! ([`DebtKind`]) so the type system, not convention, prevents reading a
//! field that does not exist for the other shape.

use chrono::{DateTime, Utc};
use cobro_shared::{ClientId, DebtId, PaymentId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::Currency;

/// Lifecycle state of a debt, derived from its remaining metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebtStatus {
    /// Nothing has been paid yet.
    Pending,
    /// Some, but not all, has been paid.
    Partial,
    /// Fully settled (remaining metric within tolerance of zero).
    Paid,
}

impl DebtStatus {
    /// Returns true while the debt still accepts payments.
    #[must_use]
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Paid)
    }
}

/// A catalog entry referenced by inventory debts.
///
/// Debts keep their own name snapshot, so deleting a product never
/// corrupts existing history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
}

/// A payment recorded against a debt. Immutable once created; payments are
/// append-only and are only discarded when their whole debt is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// The debt this payment reduces.
    pub debt_id: DebtId,
    /// The amount tendered, in the currency used.
    pub amount_paid_original: Decimal,
    /// The currency the client actually handed over.
    pub currency: Currency,
    /// The exchange rate in effect at the moment of payment.
    pub exchange_rate: Decimal,
    /// The tendered amount normalized into CUP.
    pub amount_paid_cup: Decimal,
    /// For inventory settlements: how many boxes this payment covered.
    pub quantity_paid: Option<Decimal>,
    /// When the payment was recorded.
    pub date: DateTime<Utc>,
    /// Optional free-text note.
    pub note: Option<String>,
}

/// The obligation variant of a debt. Fixed at creation; a debt never
/// changes kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum DebtKind {
    /// An obligation denominated in currency.
    Monetary {
        /// The amount as entered, in the original currency.
        original_amount: Decimal,
        /// The currency the debt was denominated in.
        original_currency: Currency,
        /// The rate in effect at creation.
        exchange_rate: Decimal,
        /// The debt value normalized into CUP, fixed at creation.
        total_cup: Decimal,
        /// What is still owed, in CUP.
        remaining_cup: Decimal,
    },
    /// An obligation denominated in units of a product ("boxes"), whose
    /// cash value is determined only at settlement via a unit price.
    Inventory {
        /// Total boxes owed (grows when open debts for the same product
        /// are merged).
        initial_quantity: Decimal,
        /// Boxes left to settle.
        remaining_quantity: Decimal,
        /// Cash collected so far across settlements, in CUP. Starts at 0:
        /// zero means "no price established yet", not "debt of zero".
        collected_cup: Decimal,
    },
}

/// One obligation owed by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// Unique identifier.
    pub id: DebtId,
    /// The client that owes this debt.
    pub client_id: ClientId,
    /// The catalog product backing an inventory debt, if any.
    pub product_id: Option<ProductId>,
    /// Immutable copy of the product name (or free-text label) taken at
    /// creation, so later product edits or deletes cannot alter history.
    pub name_snapshot: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Creation timestamp; refreshed when an open inventory debt absorbs
    /// a new lot. Cascading allocation orders monetary debts by this.
    pub date: DateTime<Utc>,
    /// Derived lifecycle state.
    pub status: DebtStatus,
    /// Payment history, append-only.
    pub payments: Vec<Payment>,
    /// Monetary or inventory shape.
    #[serde(flatten)]
    pub kind: DebtKind,
}

impl Debt {
    /// Returns true for currency-denominated debts.
    #[must_use]
    pub fn is_monetary(&self) -> bool {
        matches!(self.kind, DebtKind::Monetary { .. })
    }

    /// Returns true for goods-denominated debts.
    #[must_use]
    pub fn is_inventory(&self) -> bool {
        matches!(self.kind, DebtKind::Inventory { .. })
    }

    /// What is still owed, in the debt's own metric (CUP or boxes).
    #[must_use]
    pub fn remaining_metric(&self) -> Decimal {
        match &self.kind {
            DebtKind::Monetary { remaining_cup, .. } => *remaining_cup,
            DebtKind::Inventory {
                remaining_quantity, ..
            } => *remaining_quantity,
        }
    }

    /// The full obligation, in the debt's own metric (CUP or boxes).
    #[must_use]
    pub fn initial_metric(&self) -> Decimal {
        match &self.kind {
            DebtKind::Monetary { total_cup, .. } => *total_cup,
            DebtKind::Inventory {
                initial_quantity, ..
            } => *initial_quantity,
        }
    }

    /// Outstanding CUP balance. Zero for inventory debts, whose value is
    /// undefined until a unit price is set at settlement.
    #[must_use]
    pub fn remaining_cup(&self) -> Decimal {
        match &self.kind {
            DebtKind::Monetary { remaining_cup, .. } => *remaining_cup,
            DebtKind::Inventory { .. } => Decimal::ZERO,
        }
    }

    /// Boxes left to settle. Zero for monetary debts.
    #[must_use]
    pub fn remaining_quantity(&self) -> Decimal {
        match &self.kind {
            DebtKind::Monetary { .. } => Decimal::ZERO,
            DebtKind::Inventory {
                remaining_quantity, ..
            } => *remaining_quantity,
        }
    }

    /// Checks the accounting invariants that must hold after every
    /// mutation. Debug builds abort on violation.
    pub fn assert_invariants(&self) {
        use super::status::{EPSILON_CUP, EPSILON_QTY};

        let paid_cup: Decimal = self.payments.iter().map(|p| p.amount_paid_cup).sum();
        let paid_qty: Decimal = self
            .payments
            .iter()
            .filter_map(|p| p.quantity_paid)
            .sum();

        match &self.kind {
            DebtKind::Monetary {
                total_cup,
                remaining_cup,
                ..
            } => {
                debug_assert!(
                    *remaining_cup >= Decimal::ZERO && *remaining_cup <= *total_cup,
                    "Invariant violated: remaining {remaining_cup} outside [0, {total_cup}]"
                );
                debug_assert!(
                    (*total_cup - *remaining_cup - paid_cup).abs() <= EPSILON_CUP,
                    "Invariant violated: payments {paid_cup} do not account for \
                     {total_cup} - {remaining_cup}"
                );
            }
            DebtKind::Inventory {
                initial_quantity,
                remaining_quantity,
                ..
            } => {
                debug_assert!(
                    *remaining_quantity >= Decimal::ZERO
                        && *remaining_quantity <= *initial_quantity,
                    "Invariant violated: remaining {remaining_quantity} outside \
                     [0, {initial_quantity}]"
                );
                debug_assert!(
                    (*initial_quantity - *remaining_quantity - paid_qty).abs() <= EPSILON_QTY,
                    "Invariant violated: settled quantity {paid_qty} does not account \
                     for {initial_quantity} - {remaining_quantity}"
                );
            }
        }
    }
}

/// Input for creating a new client.
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    /// Display name.
    pub name: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional email address.
    pub email: Option<String>,
    /// Optional free-text notes.
    pub notes: Option<String>,
}

/// A client and the debts they exclusively own. No debt outlives or is
/// shared across clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier.
    pub id: ClientId,
    /// Display name.
    pub name: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional email address.
    pub email: Option<String>,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// All debts owed by this client, open and settled.
    pub debts: Vec<Debt>,
}

impl Client {
    /// Creates a client with no debts.
    #[must_use]
    pub fn new(input: NewClient) -> Self {
        Self {
            id: ClientId::new(),
            name: input.name,
            phone: input.phone,
            email: input.email,
            notes: input.notes,
            debts: Vec::new(),
        }
    }

    /// Looks up a debt by ID.
    #[must_use]
    pub fn debt(&self, id: DebtId) -> Option<&Debt> {
        self.debts.iter().find(|d| d.id == id)
    }

    /// Looks up a debt by ID for mutation.
    pub fn debt_mut(&mut self, id: DebtId) -> Option<&mut Debt> {
        self.debts.iter_mut().find(|d| d.id == id)
    }

    /// Index of the open inventory debt for a product, if one exists.
    /// At most one such debt exists per product (the merge rule keeps a
    /// single running balance).
    #[must_use]
    pub fn open_inventory_debt(&self, product_id: ProductId) -> Option<usize> {
        self.debts.iter().position(|d| {
            d.is_inventory() && d.product_id == Some(product_id) && d.status.is_open()
        })
    }

    /// Total outstanding CUP across all monetary debts.
    #[must_use]
    pub fn total_remaining_cup(&self) -> Decimal {
        self.debts.iter().map(Debt::remaining_cup).sum()
    }

    /// Total boxes still owed across all inventory debts.
    #[must_use]
    pub fn pending_boxes(&self) -> Decimal {
        self.debts.iter().map(Debt::remaining_quantity).sum()
    }

    /// Returns true while the client has at least one open debt.
    #[must_use]
    pub fn has_open_debts(&self) -> bool {
        self.debts.iter().any(|d| d.status.is_open())
    }
}
