//! Interface to the external reminder/analysis assistant.
//!
//! The assistant itself (an external AI text service) is a thin
//! collaborator and is not implemented here - only its contract. Both
//! operations may fail or be unavailable at any time, and both degrade to
//! a fixed fallback string rather than raising to the caller.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::debt::{Client, Debt, DebtKind};
use crate::ledger::Snapshot;

/// Fixed text returned when a collection message cannot be generated.
pub const COLLECTION_FALLBACK: &str =
    "The assistant is unavailable. Please draft the payment reminder manually.";

/// Fixed text returned when a portfolio review cannot be generated.
pub const REVIEW_FALLBACK: &str =
    "The assistant is unavailable. No portfolio review could be generated.";

/// Errors an assistant implementation can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdvisorError {
    /// No assistant is configured (e.g. missing API key).
    #[error("assistant is not configured")]
    NotConfigured,

    /// The assistant was reached but the request failed.
    #[error("assistant request failed: {0}")]
    Unavailable(String),
}

/// What the assistant gets to know about one client.
#[derive(Debug, Clone)]
pub struct ClientDigest {
    /// The client's display name.
    pub name: String,
    /// Total outstanding CUP across monetary debts.
    pub total_remaining_cup: Decimal,
    /// Total boxes still owed.
    pub pending_boxes: Decimal,
    /// One human-readable line per open debt.
    pub lines: Vec<String>,
}

impl ClientDigest {
    /// Builds the digest from a client, listing only open debts.
    #[must_use]
    pub fn from_client(client: &Client) -> Self {
        let lines = client
            .debts
            .iter()
            .filter(|d| d.status.is_open())
            .map(Self::debt_line)
            .collect();
        Self {
            name: client.name.clone(),
            total_remaining_cup: client.total_remaining_cup(),
            pending_boxes: client.pending_boxes(),
            lines,
        }
    }

    fn debt_line(debt: &Debt) -> String {
        match &debt.kind {
            DebtKind::Monetary {
                remaining_cup,
                original_amount,
                original_currency,
                ..
            } => format!(
                "- {}: owes {} CUP (original: {} {})",
                debt.name_snapshot, remaining_cup, original_amount, original_currency
            ),
            DebtKind::Inventory {
                remaining_quantity, ..
            } => format!(
                "- {}: owes {} boxes (price set at settlement)",
                debt.name_snapshot, remaining_quantity
            ),
        }
    }
}

/// What the assistant gets to know about the whole portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioDigest {
    /// Total outstanding CUP across all clients.
    pub total_receivable_cup: Decimal,
    /// Number of registered clients.
    pub client_count: usize,
    /// Number of clients with at least one open debt.
    pub debtor_count: usize,
}

impl PortfolioDigest {
    /// Builds the digest from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            total_receivable_cup: snapshot.total_receivable_cup(),
            client_count: snapshot.clients.len(),
            debtor_count: snapshot.active_clients(),
        }
    }
}

/// The external assistant contract.
pub trait Advisor {
    /// Drafts a short, courteous payment reminder for one client.
    fn collection_message(&self, digest: &ClientDigest) -> Result<String, AdvisorError>;

    /// Produces a brief health review of the whole receivables portfolio.
    fn portfolio_review(&self, digest: &PortfolioDigest) -> Result<String, AdvisorError>;
}

/// The always-unavailable assistant used when nothing is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAdvisor;

impl Advisor for NoopAdvisor {
    fn collection_message(&self, _digest: &ClientDigest) -> Result<String, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }

    fn portfolio_review(&self, _digest: &PortfolioDigest) -> Result<String, AdvisorError> {
        Err(AdvisorError::NotConfigured)
    }
}

/// Asks the assistant for a collection message, degrading to the fixed
/// fallback text on any failure.
pub fn collection_message_or_fallback(advisor: &dyn Advisor, client: &Client) -> String {
    let digest = ClientDigest::from_client(client);
    advisor
        .collection_message(&digest)
        .unwrap_or_else(|_| COLLECTION_FALLBACK.to_string())
}

/// Asks the assistant for a portfolio review, degrading to the fixed
/// fallback text on any failure.
pub fn portfolio_review_or_fallback(advisor: &dyn Advisor, snapshot: &Snapshot) -> String {
    let digest = PortfolioDigest::from_snapshot(snapshot);
    advisor
        .portfolio_review(&digest)
        .unwrap_or_else(|_| REVIEW_FALLBACK.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::debt::{DebtFactory, NewClient};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    struct CannedAdvisor;

    impl Advisor for CannedAdvisor {
        fn collection_message(&self, digest: &ClientDigest) -> Result<String, AdvisorError> {
            Ok(format!("Dear {}, please settle your balance.", digest.name))
        }

        fn portfolio_review(&self, digest: &PortfolioDigest) -> Result<String, AdvisorError> {
            Ok(format!("{} clients owe money.", digest.debtor_count))
        }
    }

    struct FailingAdvisor;

    impl Advisor for FailingAdvisor {
        fn collection_message(&self, _: &ClientDigest) -> Result<String, AdvisorError> {
            Err(AdvisorError::Unavailable("timeout".to_string()))
        }

        fn portfolio_review(&self, _: &PortfolioDigest) -> Result<String, AdvisorError> {
            Err(AdvisorError::Unavailable("timeout".to_string()))
        }
    }

    fn client_with_debts() -> Client {
        let mut client = Client::new(NewClient {
            name: "Juan".to_string(),
            ..NewClient::default()
        });
        let open = DebtFactory::new_monetary(
            client.id,
            dec!(100),
            Currency::Cup,
            Decimal::ONE,
            Some("Loan".to_string()),
            Utc::now(),
        )
        .unwrap();
        client.debts.push(open);
        client
    }

    #[test]
    fn test_digest_lists_open_debts_only() {
        let mut client = client_with_debts();
        let mut paid = DebtFactory::new_monetary(
            client.id,
            dec!(50),
            Currency::Cup,
            Decimal::ONE,
            None,
            Utc::now(),
        )
        .unwrap();
        crate::debt::PaymentAllocator::pay_debt(
            &mut paid,
            &crate::debt::PaymentInput {
                amount: dec!(50),
                currency: Currency::Cup,
                exchange_rate: Decimal::ONE,
                price_per_unit: None,
                note: None,
            },
            Utc::now(),
        )
        .unwrap();
        client.debts.push(paid);

        let digest = ClientDigest::from_client(&client);
        assert_eq!(digest.lines.len(), 1);
        assert!(digest.lines[0].contains("Loan"));
        assert_eq!(digest.total_remaining_cup, dec!(100));
    }

    #[test]
    fn test_working_advisor_is_used() {
        let client = client_with_debts();
        let text = collection_message_or_fallback(&CannedAdvisor, &client);
        assert_eq!(text, "Dear Juan, please settle your balance.");
    }

    #[test]
    fn test_failure_degrades_to_fallback() {
        let client = client_with_debts();
        let text = collection_message_or_fallback(&FailingAdvisor, &client);
        assert_eq!(text, COLLECTION_FALLBACK);
    }

    #[test]
    fn test_unconfigured_advisor_degrades_to_fallback() {
        let snapshot = Snapshot::default();
        let text = portfolio_review_or_fallback(&NoopAdvisor, &snapshot);
        assert_eq!(text, REVIEW_FALLBACK);
    }

    #[test]
    fn test_portfolio_digest_counts() {
        let mut snapshot = Snapshot::default();
        snapshot.clients.push(client_with_debts());
        snapshot.clients.push(Client::new(NewClient::default()));

        let digest = PortfolioDigest::from_snapshot(&snapshot);
        assert_eq!(digest.client_count, 2);
        assert_eq!(digest.debtor_count, 1);
        assert_eq!(digest.total_receivable_cup, dec!(100));
    }
}
