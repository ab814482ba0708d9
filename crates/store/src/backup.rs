//! Backup export and import as files.

use std::fs;
use std::path::{Path, PathBuf};

use cobro_core::ledger::{Backup, LedgerError, StoreError};
use thiserror::Error;
use tracing::info;

/// Errors from reading or writing backup files.
#[derive(Debug, Error)]
pub enum BackupFileError {
    /// The file could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The file was read but is not a valid backup document.
    #[error(transparent)]
    Format(#[from] LedgerError),
}

/// Writes a backup into `dir` as `backup-cobro-YYYY-MM-DD.json` and
/// returns the path written.
///
/// # Errors
///
/// Returns [`BackupFileError::Store`] if the file cannot be written.
pub fn export_to_dir(backup: &Backup, dir: &Path) -> Result<PathBuf, BackupFileError> {
    let name = format!("backup-cobro-{}.json", backup.timestamp.format("%Y-%m-%d"));
    let path = dir.join(name);

    let json = backup
        .to_json()
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    fs::write(&path, json).map_err(|e| StoreError::Io(e.to_string()))?;

    info!(path = %path.display(), "backup exported");
    Ok(path)
}

/// Reads and validates a backup file.
///
/// # Errors
///
/// Returns [`BackupFileError::Store`] if the file cannot be read, or
/// [`BackupFileError::Format`] if its contents fail backup validation.
pub fn import_from_file(path: &Path) -> Result<Backup, BackupFileError> {
    let contents = fs::read_to_string(path).map_err(|e| StoreError::Io(e.to_string()))?;
    let backup = Backup::parse(&contents)?;
    info!(path = %path.display(), clients = backup.clients.len(), "backup imported");
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cobro_core::ledger::Snapshot;

    #[test]
    fn test_export_names_file_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let backup = Backup::capture(&Snapshot::default(), timestamp);

        let path = export_to_dir(&backup, dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "backup-cobro-2026-03-14.json"
        );
        assert!(path.exists());
    }

    #[test]
    fn test_export_then_import_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let backup = Backup::capture(&Snapshot::default(), Utc::now());

        let path = export_to_dir(&backup, dir.path()).unwrap();
        let imported = import_from_file(&path).unwrap();
        assert_eq!(imported, backup);
    }

    #[test]
    fn test_import_missing_file_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = import_from_file(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(BackupFileError::Store(_))));
    }

    #[test]
    fn test_import_invalid_document_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "clients": [] }"#).unwrap();

        let result = import_from_file(&path);
        assert!(matches!(result, Err(BackupFileError::Format(_))));
    }
}
