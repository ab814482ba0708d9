//! JSON-file persistence for the Cobro ledger.
//!
//! Implements the engine's [`cobro_core::ledger::SnapshotStore`] seam with
//! a single pretty-printed JSON file, plus helpers for versioned backup
//! exports and imports.

pub mod backup;
pub mod json;

pub use backup::{BackupFileError, export_to_dir, import_from_file};
pub use json::JsonStore;
