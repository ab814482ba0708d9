//! The ledger's in-memory state snapshot.

use cobro_shared::{ClientId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::debt::{Client, Product};

/// The whole ledger state as plain data: all clients (with their debts)
/// and the product catalog. Commands never mutate a snapshot in place -
/// they compute a new one and replace the old atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All clients, each owning its debts.
    pub clients: Vec<Client>,
    /// The product catalog referenced by inventory debts.
    pub products: Vec<Product>,
}

impl Snapshot {
    /// Looks up a client by ID.
    #[must_use]
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Looks up a client by ID for mutation.
    pub fn client_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    /// Looks up a product by ID.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Total outstanding CUP across all clients' monetary debts.
    #[must_use]
    pub fn total_receivable_cup(&self) -> Decimal {
        self.clients.iter().map(Client::total_remaining_cup).sum()
    }

    /// Total boxes still owed across all clients' inventory debts.
    #[must_use]
    pub fn pending_boxes(&self) -> Decimal {
        self.clients.iter().map(Client::pending_boxes).sum()
    }

    /// Number of clients with at least one open debt.
    #[must_use]
    pub fn active_clients(&self) -> usize {
        self.clients.iter().filter(|c| c.has_open_debts()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::debt::{DebtFactory, NewClient};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_snapshot_totals() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.total_receivable_cup(), Decimal::ZERO);
        assert_eq!(snapshot.pending_boxes(), Decimal::ZERO);
        assert_eq!(snapshot.active_clients(), 0);
    }

    #[test]
    fn test_totals_aggregate_across_clients() {
        let mut snapshot = Snapshot::default();
        for amount in [dec!(100), dec!(250)] {
            let mut client = Client::new(NewClient::default());
            let debt = DebtFactory::new_monetary(
                client.id,
                amount,
                Currency::Cup,
                Decimal::ONE,
                None,
                Utc::now(),
            )
            .unwrap();
            client.debts.push(debt);
            snapshot.clients.push(client);
        }
        snapshot.clients.push(Client::new(NewClient::default()));

        assert_eq!(snapshot.total_receivable_cup(), dec!(350));
        assert_eq!(snapshot.active_clients(), 2);
    }
}
