//! Snapshot persistence as a single JSON file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cobro_core::ledger::{Snapshot, SnapshotStore, StoreError};
use tracing::{debug, info};

/// Persists the ledger snapshot as one pretty-printed JSON file.
///
/// Writes go to a temporary sibling file first and are then renamed over
/// the target, so a crash mid-write cannot leave a truncated snapshot.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Creates a store over the given file path. The file does not need
    /// to exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map_or_else(
            || std::ffi::OsString::from("cobro.json"),
            std::ffi::OsStr::to_os_string,
        );
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no snapshot file yet, starting empty");
                Ok(Snapshot::default())
            }
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&temp, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;

        debug!(path = %self.path.display(), "snapshot persisted");
        Ok(())
    }
}
