use std::fs;
use std::path::{Path, PathBuf};

use super::{FleetSnapshot, FleetStore, StoreError};

/// File-backed store holding the entire database as one pretty-printed JSON
/// document, read and rewritten wholesale.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Points at an existing database file without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the database, seeding an empty snapshot when the file does not
    /// exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);
        if !store.path.exists() {
            store.store(&FleetSnapshot::default())?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_display(&self) -> String {
        self.path.display().to_string()
    }
}

impl FleetStore for JsonFileStore {
    fn load(&self) -> Result<FleetSnapshot, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path_display(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
            path: self.path_display(),
            source,
        })
    }

    fn store(&self, snapshot: &FleetSnapshot) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(snapshot).map_err(StoreError::Encode)?;
        fs::write(&self.path, encoded).map_err(|source| StoreError::Write {
            path: self.path_display(),
            source,
        })
    }
}
