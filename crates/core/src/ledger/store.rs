//! The persistence seam.
//!
//! The engine never performs I/O of its own: it talks to an injected
//! [`SnapshotStore`]. Implementations live outside this crate (the JSON
//! file store in `cobro-store`); [`MemoryStore`] here backs tests and
//! ephemeral sessions.

use std::cell::{Cell, RefCell};

use thiserror::Error;

use super::snapshot::Snapshot;

/// Errors a snapshot store can report.
///
/// Store failures never invalidate the in-memory snapshot - the ledger
/// stays the source of truth for the session and surfaces the failure as
/// a degraded-mode signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Reading or writing the underlying medium failed.
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// The persisted document could not be encoded or decoded.
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}

/// Loads and saves ledger snapshots.
pub trait SnapshotStore {
    /// Loads the persisted snapshot. A store with nothing persisted yet
    /// returns an empty snapshot.
    fn load(&self) -> Result<Snapshot, StoreError>;

    /// Persists the given snapshot, replacing whatever was stored before.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: RefCell<Snapshot>,
    fail_saves: Cell<bool>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with a snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: RefCell::new(snapshot),
            fail_saves: Cell::new(false),
        }
    }

    /// Makes every subsequent `save` fail, to exercise degraded mode.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Returns a copy of what is currently stored.
    #[must_use]
    pub fn stored(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot.borrow().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if self.fail_saves.get() {
            return Err(StoreError::Io("simulated write failure".to_string()));
        }
        *self.snapshot.borrow_mut() = snapshot.clone();
        Ok(())
    }
}
