//! The ledger orchestrator.
//!
//! [`Ledger`] owns the per-client collection of debts and the product
//! catalog. Every command reads the full current snapshot, computes a new
//! snapshot on a working copy, and performs one atomic replace - no
//! in-place mutation is ever visible mid-computation, and a failed
//! command leaves the state untouched.
//!
//! The engine assumes a single writer. Persistence is decoupled: the
//! injected [`SnapshotStore`] is written after the in-memory replace, and
//! a write failure degrades - it never reverts the snapshot, which stays
//! the source of truth for the session.

use chrono::Utc;
use cobro_shared::{ClientId, DebtId, ProductId};
use rust_decimal::Decimal;

use super::backup::Backup;
use super::error::LedgerError;
use super::snapshot::Snapshot;
use super::store::{SnapshotStore, StoreError};
use crate::currency::Currency;
use crate::debt::{
    CascadeOutcome, Client, DebtFactory, NewClient, Payment, PaymentAllocator, PaymentInput,
    Product,
};

/// Whether a committed command reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// The snapshot was persisted.
    Saved,
    /// The in-memory snapshot was replaced, but persisting it failed.
    /// The session keeps running on the in-memory state.
    Degraded(StoreError),
}

impl Persistence {
    /// Returns true if the snapshot reached the store.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

/// Result of a state-changing command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    /// The snapshot after the command.
    pub snapshot: Snapshot,
    /// Whether the new snapshot reached the store.
    pub persistence: Persistence,
}

/// Result of a debt-creating command.
#[derive(Debug, Clone)]
pub struct DebtOutcome {
    /// The debt that was created, or merged into.
    pub debt_id: DebtId,
    /// The snapshot after the command.
    pub snapshot: Snapshot,
    /// Whether the new snapshot reached the store.
    pub persistence: Persistence,
}

/// Result of a targeted payment command.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The payment that was recorded.
    pub payment: Payment,
    /// The snapshot after the command.
    pub snapshot: Snapshot,
    /// Whether the new snapshot reached the store.
    pub persistence: Persistence,
}

/// Result of a cascading payment command.
#[derive(Debug, Clone)]
pub struct CascadeReceipt {
    /// What the cascade applied and what was left over.
    pub cascade: CascadeOutcome,
    /// The snapshot after the command.
    pub snapshot: Snapshot,
    /// Whether the new snapshot reached the store.
    pub persistence: Persistence,
}

/// The snapshot-owning orchestrator behind the command surface.
pub struct Ledger<S: SnapshotStore> {
    snapshot: Snapshot,
    store: S,
}

impl<S: SnapshotStore> Ledger<S> {
    /// Opens a ledger from whatever the store has persisted.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the persisted snapshot cannot be
    /// loaded.
    pub fn open(store: S) -> Result<Self, StoreError> {
        let snapshot = store.load()?;
        Ok(Self { snapshot, store })
    }

    /// Creates a ledger over an explicit snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot, store: S) -> Self {
        Self { snapshot, store }
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Replaces the snapshot and pushes it to the store.
    fn commit(&mut self, next: Snapshot) -> (Snapshot, Persistence) {
        self.snapshot = next;
        let persistence = match self.store.save(&self.snapshot) {
            Ok(()) => Persistence::Saved,
            Err(err) => Persistence::Degraded(err),
        };
        (self.snapshot.clone(), persistence)
    }

    // ========== Clients ==========

    /// Registers a new client with no debts.
    pub fn create_client(&mut self, input: NewClient) -> CommandOutcome {
        let mut next = self.snapshot.clone();
        next.clients.push(Client::new(input));
        let (snapshot, persistence) = self.commit(next);
        CommandOutcome {
            snapshot,
            persistence,
        }
    }

    /// Deletes a client together with all their debts and payment history.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ClientNotFound`] if the client does not
    /// exist.
    pub fn delete_client(&mut self, id: ClientId) -> Result<CommandOutcome, LedgerError> {
        let mut next = self.snapshot.clone();
        let idx = next
            .clients
            .iter()
            .position(|c| c.id == id)
            .ok_or(LedgerError::ClientNotFound(id))?;
        next.clients.remove(idx);
        let (snapshot, persistence) = self.commit(next);
        Ok(CommandOutcome {
            snapshot,
            persistence,
        })
    }

    // ========== Products ==========

    /// Adds a product to the catalog.
    pub fn create_product(&mut self, name: String) -> CommandOutcome {
        let mut next = self.snapshot.clone();
        next.products.push(Product {
            id: ProductId::new(),
            name,
        });
        let (snapshot, persistence) = self.commit(next);
        CommandOutcome {
            snapshot,
            persistence,
        }
    }

    /// Removes a product from the catalog. Existing debts keep their name
    /// snapshot, so history is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ProductNotFound`] if the product does not
    /// exist.
    pub fn delete_product(&mut self, id: ProductId) -> Result<CommandOutcome, LedgerError> {
        let mut next = self.snapshot.clone();
        let idx = next
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(LedgerError::ProductNotFound(id))?;
        next.products.remove(idx);
        let (snapshot, persistence) = self.commit(next);
        Ok(CommandOutcome {
            snapshot,
            persistence,
        })
    }

    // ========== Debts ==========

    /// Creates a monetary debt for a client.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ClientNotFound`], or the engine's validation
    /// errors for a non-positive amount or rate.
    pub fn create_monetary_debt(
        &mut self,
        client_id: ClientId,
        amount: Decimal,
        currency: Currency,
        rate: Decimal,
        description: Option<String>,
    ) -> Result<DebtOutcome, LedgerError> {
        let mut next = self.snapshot.clone();
        let client = next
            .client_mut(client_id)
            .ok_or(LedgerError::ClientNotFound(client_id))?;
        let debt =
            DebtFactory::new_monetary(client_id, amount, currency, rate, description, Utc::now())?;
        let debt_id = debt.id;
        client.debts.push(debt);
        let (snapshot, persistence) = self.commit(next);
        Ok(DebtOutcome {
            debt_id,
            snapshot,
            persistence,
        })
    }

    /// Creates an inventory debt, or merges the quantity into the client's
    /// existing open debt for the same product.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ClientNotFound`],
    /// [`LedgerError::ProductNotFound`], or the engine's validation error
    /// for a non-positive quantity.
    pub fn create_inventory_debt(
        &mut self,
        client_id: ClientId,
        product_id: ProductId,
        quantity: Decimal,
    ) -> Result<DebtOutcome, LedgerError> {
        let mut next = self.snapshot.clone();
        let product = next
            .product(product_id)
            .cloned()
            .ok_or(LedgerError::ProductNotFound(product_id))?;
        let client = next
            .client_mut(client_id)
            .ok_or(LedgerError::ClientNotFound(client_id))?;
        let debt_id =
            DebtFactory::create_or_merge_inventory(client, &product, quantity, Utc::now())?;
        let (snapshot, persistence) = self.commit(next);
        Ok(DebtOutcome {
            debt_id,
            snapshot,
            persistence,
        })
    }

    /// Deletes a debt permanently, discarding its payment history.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ClientNotFound`] or
    /// [`LedgerError::DebtNotFound`].
    pub fn delete_debt(
        &mut self,
        client_id: ClientId,
        debt_id: DebtId,
    ) -> Result<CommandOutcome, LedgerError> {
        let mut next = self.snapshot.clone();
        let client = next
            .client_mut(client_id)
            .ok_or(LedgerError::ClientNotFound(client_id))?;
        let idx = client
            .debts
            .iter()
            .position(|d| d.id == debt_id)
            .ok_or(LedgerError::DebtNotFound(debt_id))?;
        client.debts.remove(idx);
        let (snapshot, persistence) = self.commit(next);
        Ok(CommandOutcome {
            snapshot,
            persistence,
        })
    }

    // ========== Payments ==========

    /// Applies a targeted payment to one specific debt.
    ///
    /// # Errors
    ///
    /// Returns the lookup errors, or any of the engine's payment
    /// validation errors; the snapshot is unchanged on failure.
    pub fn pay_debt(
        &mut self,
        client_id: ClientId,
        debt_id: DebtId,
        input: &PaymentInput,
    ) -> Result<PaymentOutcome, LedgerError> {
        let mut next = self.snapshot.clone();
        let client = next
            .client_mut(client_id)
            .ok_or(LedgerError::ClientNotFound(client_id))?;
        let debt = client
            .debt_mut(debt_id)
            .ok_or(LedgerError::DebtNotFound(debt_id))?;
        let payment = PaymentAllocator::pay_debt(debt, input, Utc::now())?;
        let (snapshot, persistence) = self.commit(next);
        Ok(PaymentOutcome {
            payment,
            snapshot,
            persistence,
        })
    }

    /// Spreads one lump monetary payment across a client's open monetary
    /// debts, oldest first. Any amount that could not be allocated is
    /// reported in the receipt, never silently dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ClientNotFound`], or the engine's validation
    /// errors for a non-positive amount or rate.
    pub fn pay_cascading(
        &mut self,
        client_id: ClientId,
        amount: Decimal,
        currency: Currency,
        rate: Decimal,
    ) -> Result<CascadeReceipt, LedgerError> {
        let mut next = self.snapshot.clone();
        let client = next
            .client_mut(client_id)
            .ok_or(LedgerError::ClientNotFound(client_id))?;
        let cascade =
            PaymentAllocator::allocate_lump(client, amount, currency, rate, Utc::now())?;
        let (snapshot, persistence) = self.commit(next);
        Ok(CascadeReceipt {
            cascade,
            snapshot,
            persistence,
        })
    }

    // ========== Backup & reset ==========

    /// Captures the current snapshot as a versioned backup.
    #[must_use]
    pub fn export_backup(&self) -> Backup {
        Backup::capture(&self.snapshot, Utc::now())
    }

    /// Replaces the entire snapshot with a restored backup. All-or-nothing:
    /// validation happens in [`Backup::parse`], and by the time a `Backup`
    /// value exists the replace cannot partially apply.
    pub fn restore_backup(&mut self, backup: Backup) -> CommandOutcome {
        let (snapshot, persistence) = self.commit(backup.into_snapshot());
        CommandOutcome {
            snapshot,
            persistence,
        }
    }

    /// Factory reset: discards every client, debt, and product.
    pub fn reset(&mut self) -> CommandOutcome {
        let (snapshot, persistence) = self.commit(Snapshot::default());
        CommandOutcome {
            snapshot,
            persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::store::MemoryStore;
    use rust_decimal_macros::dec;

    fn ledger() -> Ledger<MemoryStore> {
        Ledger::with_snapshot(Snapshot::default(), MemoryStore::new())
    }

    fn add_client(ledger: &mut Ledger<MemoryStore>, name: &str) -> ClientId {
        let outcome = ledger.create_client(NewClient {
            name: name.to_string(),
            ..NewClient::default()
        });
        outcome.snapshot.clients.last().unwrap().id
    }

    #[test]
    fn test_create_and_delete_client() {
        let mut ledger = ledger();
        let id = add_client(&mut ledger, "Juan");
        assert_eq!(ledger.snapshot().clients.len(), 1);

        ledger.delete_client(id).unwrap();
        assert!(ledger.snapshot().clients.is_empty());
    }

    #[test]
    fn test_delete_unknown_client_fails() {
        let mut ledger = ledger();
        let id = ClientId::new();
        assert_eq!(
            ledger.delete_client(id),
            Err(LedgerError::ClientNotFound(id))
        );
    }

    #[test]
    fn test_inventory_debt_requires_known_product() {
        let mut ledger = ledger();
        let client_id = add_client(&mut ledger, "Maria");
        let missing = ProductId::new();

        let result = ledger.create_inventory_debt(client_id, missing, dec!(5));
        assert!(matches!(
            result,
            Err(LedgerError::ProductNotFound(id)) if id == missing
        ));
        // Nothing changed
        assert!(ledger.snapshot().client(client_id).unwrap().debts.is_empty());
    }

    #[test]
    fn test_failed_command_leaves_store_untouched() {
        let mut ledger = ledger();
        let client_id = add_client(&mut ledger, "Maria");

        let result = ledger.create_monetary_debt(
            client_id,
            Decimal::ZERO,
            Currency::Cup,
            Decimal::ONE,
            None,
        );
        assert!(result.is_err());
        assert!(ledger.snapshot().client(client_id).unwrap().debts.is_empty());
    }

    #[test]
    fn test_degraded_persistence_keeps_in_memory_state() {
        let store = MemoryStore::new();
        store.fail_saves(true);
        let mut ledger = Ledger::with_snapshot(Snapshot::default(), store);

        let outcome = ledger.create_client(NewClient {
            name: "Ana".to_string(),
            ..NewClient::default()
        });

        assert!(!outcome.persistence.is_saved());
        // The in-memory snapshot is still the source of truth
        assert_eq!(ledger.snapshot().clients.len(), 1);
    }

    #[test]
    fn test_delete_product_keeps_debt_name_snapshot() {
        let mut ledger = ledger();
        let client_id = add_client(&mut ledger, "Pedro");
        let outcome = ledger.create_product("Chicken box 15kg".to_string());
        let product_id = outcome.snapshot.products.last().unwrap().id;

        ledger
            .create_inventory_debt(client_id, product_id, dec!(3))
            .unwrap();
        ledger.delete_product(product_id).unwrap();

        let snapshot = ledger.snapshot();
        assert!(snapshot.products.is_empty());
        let debt = &snapshot.client(client_id).unwrap().debts[0];
        assert_eq!(debt.name_snapshot, "Chicken box 15kg");
    }
}
