//! Position storage.
//!
//! The book maps each instrument to its positions in the order they were
//! opened. [`JsonFileStore`] replaces the file atomically: the new content is
//! written to `<file>.tmp` and renamed over the old one.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use signal_core::error::LedgerError;
use signal_core::types::Position;
use tracing::debug;

/// Instrument → positions, oldest first.
pub type PositionBook = BTreeMap<String, Vec<Position>>;

/// Backing storage for the ledger.
pub trait PositionStore: Send {
    /// Read the whole book. A store that has never been written is empty.
    fn load(&self) -> Result<PositionBook, LedgerError>;

    /// Replace the stored book.
    fn save(&mut self, book: &PositionBook) -> Result<(), LedgerError>;
}

/// Pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn persist_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Persist {
            path: self.path.clone(),
            source,
        }
    }
}

impl PositionStore for JsonFileStore {
    fn load(&self) -> Result<PositionBook, LedgerError> {
        if !self.path.exists() {
            return Ok(PositionBook::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| LedgerError::Load {
            path: self.path.clone(),
            source,
        })?;
        let book: PositionBook = serde_json::from_str(&content)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;

        debug!(path = %self.path.display(), instruments = book.len(), "Loaded position store");
        Ok(book)
    }

    fn save(&mut self, book: &PositionBook) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(book)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.persist_error(e))?;
        }

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json).map_err(|e| self.persist_error(e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.persist_error(e)
        })?;

        debug!(path = %self.path.display(), "Saved position store");
        Ok(())
    }
}

/// In-process store, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    book: PositionBook,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(book: PositionBook) -> Self {
        Self { book }
    }

    /// Last saved book.
    pub fn book(&self) -> &PositionBook {
        &self.book
    }
}

impl PositionStore for MemoryStore {
    fn load(&self) -> Result<PositionBook, LedgerError> {
        Ok(self.book.clone())
    }

    fn save(&mut self, book: &PositionBook) -> Result<(), LedgerError> {
        self.book = book.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use signal_core::types::{PositionStatus, SignalLevel, Side};

    fn closed_position() -> Position {
        Position {
            id: "AR/USDT-7f3a".into(),
            instrument: "AR/USDT".into(),
            side: Side::Long,
            entry_price: 5.5,
            entry_time: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
            exit_price: Some(5.05),
            exit_time: Some(Utc.with_ymd_and_hms(2026, 3, 4, 12, 30, 0).unwrap()),
            strength_at_entry: 0.6349,
            level_at_entry: SignalLevel::Medium,
            status: PositionStatus::Closed,
            profit_loss: Some(5.05 - 5.5),
            profit_loss_pct: Some((5.05 - 5.5) / 5.5 * 100.0),
            holding_days: Some(3),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("positions.json"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("state/positions.json"));

        let mut book = PositionBook::new();
        book.insert("AR/USDT".into(), vec![closed_position()]);
        store.save(&book).unwrap();

        assert!(!store.tmp_path().exists());
        assert_eq!(store.load().unwrap(), book);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.json");
        fs::write(&path, "{ not json").unwrap();

        let result = JsonFileStore::new(&path).load();
        assert!(matches!(result, Err(LedgerError::Serialization(_))));
    }

    #[test]
    fn test_tmp_path_appends_suffix() {
        let store = JsonFileStore::new("logs/positions.json");
        assert_eq!(store.tmp_path(), PathBuf::from("logs/positions.json.tmp"));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        let mut book = PositionBook::new();
        book.insert("X".into(), vec![closed_position()]);

        store.save(&book).unwrap();
        assert_eq!(store.load().unwrap(), book);
        assert_eq!(store.book().len(), 1);
    }
}
