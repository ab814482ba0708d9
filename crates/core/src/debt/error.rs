//! Debt engine error types.
//!
//! Every variant is a local validation failure detected before any
//! mutation: a rejected operation leaves the debt (and the snapshot that
//! owns it) completely unchanged.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::currency::InvalidRate;

/// Errors that can occur while creating debts or applying payments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DebtError {
    /// Monetary amounts must be positive.
    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Inventory quantities must be positive.
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),

    /// Exchange rates must be positive.
    #[error("exchange rate must be positive, got {0}")]
    InvalidRate(Decimal),

    /// Unit prices for inventory settlement must be positive.
    #[error("price per unit must be positive, got {0}")]
    InvalidUnitPrice(Decimal),

    /// The payment exceeds what is still owed.
    #[error("payment exceeds remaining debt: attempted {attempted}, remaining {remaining}")]
    Overpayment {
        /// How much the payment would have reduced the debt by.
        attempted: Decimal,
        /// What is actually still owed, in the same metric.
        remaining: Decimal,
    },
}

impl DebtError {
    /// Returns the stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::InvalidUnitPrice(_) => "INVALID_UNIT_PRICE",
            Self::Overpayment { .. } => "OVERPAYMENT",
        }
    }
}

impl From<InvalidRate> for DebtError {
    fn from(err: InvalidRate) -> Self {
        Self::InvalidRate(err.0)
    }
}
