//! Ledger error types.
//!
//! This module defines all errors the command surface can return. Every
//! variant is detected before mutation: a failed command leaves the
//! snapshot completely unchanged, so no rollback is ever needed.

use cobro_shared::{ClientId, DebtId, ProductId};
use thiserror::Error;

use crate::debt::DebtError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    // ========== Lookup Errors ==========
    /// Client not found.
    #[error("client not found: {0}")]
    ClientNotFound(ClientId),

    /// Product not found.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// Debt not found.
    #[error("debt not found: {0}")]
    DebtNotFound(DebtId),

    // ========== Backup Errors ==========
    /// A backup document failed wholesale validation.
    #[error("invalid backup format: {0}")]
    InvalidBackupFormat(String),

    // ========== Engine Errors ==========
    /// A debt or payment validation rule failed.
    #[error(transparent)]
    Debt(#[from] DebtError),
}

impl LedgerError {
    /// Returns the stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ClientNotFound(_) => "CLIENT_NOT_FOUND",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::DebtNotFound(_) => "DEBT_NOT_FOUND",
            Self::InvalidBackupFormat(_) => "INVALID_BACKUP_FORMAT",
            Self::Debt(err) => err.error_code(),
        }
    }
}
