//! File-backed snapshot store.
//!
//! Persists the entitlement snapshot as pretty-printed JSON in the
//! platform data directory (Linux: `~/.local/share/orbis/entitlement.json`,
//! macOS: `~/Library/Application Support/orbis/entitlement.json`).

use std::fs;
use std::path::{Path, PathBuf};

use super::{StateStore, StoreError};
use crate::state::EntitlementState;

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location.
    pub fn default_location() -> Self {
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orbis")
            .join("entitlement.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<EntitlementState>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                tracing::warn!(
                    "Discarding corrupt entitlement snapshot at {:?}: {}",
                    self.path,
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, state: &EntitlementState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so a crash mid-write never leaves a truncated
        // snapshot behind.
        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!("Saved entitlement snapshot to {:?}", self.path);
        Ok(())
    }

    fn reset(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
