//! Backup export and restore.
//!
//! A backup is the full snapshot wrapped in a versioned envelope. Restore
//! is all-or-nothing: the document is validated wholesale and, on success,
//! replaces the entire snapshot - there is no partial merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use super::snapshot::Snapshot;
use crate::debt::{Client, Product};

/// The backup format version this build writes and accepts.
pub const BACKUP_VERSION: u32 = 1;

fn default_backup_version() -> u32 {
    BACKUP_VERSION
}

/// A portable, versioned copy of the whole ledger state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    /// Format version.
    #[serde(default = "default_backup_version")]
    pub version: u32,
    /// When the backup was taken.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// All clients, each owning its debts.
    pub clients: Vec<Client>,
    /// The product catalog.
    pub products: Vec<Product>,
}

impl Backup {
    /// Captures the current snapshot into a backup envelope.
    #[must_use]
    pub fn capture(snapshot: &Snapshot, timestamp: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION,
            timestamp,
            clients: snapshot.clients.clone(),
            products: snapshot.products.clone(),
        }
    }

    /// Parses and validates a backup document.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidBackupFormat`] unless the document is
    /// valid JSON carrying `clients` and `products` sequences and a
    /// supported version. Nothing is restored on failure.
    pub fn parse(json: &str) -> Result<Self, LedgerError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| LedgerError::InvalidBackupFormat(format!("not valid JSON: {e}")))?;

        for field in ["clients", "products"] {
            match value.get(field) {
                None => {
                    return Err(LedgerError::InvalidBackupFormat(format!(
                        "missing '{field}' field"
                    )));
                }
                Some(v) if !v.is_array() => {
                    return Err(LedgerError::InvalidBackupFormat(format!(
                        "'{field}' must be a sequence"
                    )));
                }
                Some(_) => {}
            }
        }

        let backup: Self = serde_json::from_value(value)
            .map_err(|e| LedgerError::InvalidBackupFormat(e.to_string()))?;

        if backup.version != BACKUP_VERSION {
            return Err(LedgerError::InvalidBackupFormat(format!(
                "unsupported version {}",
                backup.version
            )));
        }
        Ok(backup)
    }

    /// Serializes the backup as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying serializer error (practically unreachable
    /// for these types).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Unwraps the envelope into a snapshot, discarding the metadata.
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            clients: self.clients,
            products: self.products,
        }
    }
}
