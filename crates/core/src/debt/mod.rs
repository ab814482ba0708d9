//! Debt creation, payment allocation, and status derivation.
//!
//! This module implements the accounting engine:
//! - Domain types for clients, products, debts, and payments
//! - Debt creation and the inventory merge rule
//! - Payment validation and allocation (targeted and cascading)
//! - Status derivation and the epsilon policy
//! - Error types for rejected operations

pub mod error;
pub mod factory;
pub mod payment;
pub mod status;
pub mod types;

#[cfg(test)]
mod props;

pub use error::DebtError;
pub use factory::DebtFactory;
pub use payment::{
    CascadeOutcome, PaymentAllocator, PaymentBreakdown, PaymentInput, PaymentValidator,
};
pub use status::{EPSILON_CUP, EPSILON_QTY};
pub use types::{Client, Debt, DebtKind, DebtStatus, NewClient, Payment, Product};
