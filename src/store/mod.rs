//! Entitlement snapshot persistence.
//!
//! The persisted state is a single JSON document under one storage key.
//! Backends are swappable behind [`StateStore`]:
//!
//! - [`JsonFileStore`]: durable file in the platform data directory
//! - [`MemoryStore`]: in-memory, for tests and ephemeral sessions

pub mod json_file;

use parking_lot::Mutex;
use thiserror::Error;

use crate::state::EntitlementState;

pub use json_file::JsonFileStore;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable store for the entitlement snapshot.
///
/// The engine owns the snapshot exclusively; no other component writes it.
pub trait StateStore: Send + Sync {
    /// Read the persisted snapshot. `Ok(None)` when nothing is stored.
    ///
    /// A snapshot that fails to parse is logged and reported as absent so
    /// a corrupt file can never brick the engine.
    fn load(&self) -> Result<Option<EntitlementState>, StoreError>;

    /// Overwrite the persisted snapshot.
    fn save(&self, state: &EntitlementState) -> Result<(), StoreError>;

    /// Clear the persisted snapshot entirely. Debug/support flows only.
    fn reset(&self) -> Result<(), StoreError>;
}

/// In-memory store holding the serialized document, so tests exercise the
/// same serde round-trip as the file backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<EntitlementState>, StoreError> {
        let data = self.data.lock();
        match data.as_deref() {
            Some(json) => match serde_json::from_str(json) {
                Ok(state) => Ok(Some(state)),
                Err(e) => {
                    tracing::warn!("Discarding corrupt entitlement snapshot: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    fn save(&self, state: &EntitlementState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        *self.data.lock() = Some(json);
        Ok(())
    }

    fn reset(&self) -> Result<(), StoreError> {
        *self.data.lock() = None;
        Ok(())
    }
}
