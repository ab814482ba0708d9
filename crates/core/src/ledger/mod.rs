//! Snapshot-owning orchestration.
//!
//! This module implements everything around the debt engine:
//! - The [`Snapshot`] state shape and its aggregate figures
//! - The [`Ledger`] orchestrator and its command surface
//! - Versioned backup export and wholesale restore
//! - The [`SnapshotStore`] persistence seam
//! - Error types for the command surface

pub mod backup;
pub mod error;
pub mod service;
pub mod snapshot;
pub mod store;


pub use backup::{BACKUP_VERSION, Backup};
pub use error::LedgerError;
pub use service::{
    CascadeReceipt, CommandOutcome, DebtOutcome, Ledger, PaymentOutcome, Persistence,
};
pub use snapshot::Snapshot;
pub use store::{MemoryStore, SnapshotStore, StoreError};
