//! Encounter persistence.
//!
//! Snapshots are written as one JSON document per storage key to a
//! [`KeyValueStore`]. Two backends exist: [`FileStore`] under the platform
//! data directory (`~/.local/share/stormclock/store/` on Linux) and the
//! process-lifetime [`MemoryStore`]. Writes are debounced by [`Autosaver`].

mod autosave;
mod error;
mod file;
mod memory;
mod persistence;

pub use autosave::{Autosaver, DEFAULT_DEBOUNCE};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use persistence::EncounterPersistence;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stormclock_types::PersistenceMode;
use tracing::warn;

/// String key-value backend for snapshots
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Directory backing the durable store.
pub fn store_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stormclock")
        .join("store")
}

/// Open the backend for `mode`, keeping durable snapshots under `root`.
/// A durable store that cannot be opened degrades to an in-memory one.
pub fn open_store(mode: PersistenceMode, root: &Path) -> Arc<dyn KeyValueStore> {
    match mode {
        PersistenceMode::Volatile => Arc::new(MemoryStore::new()),
        PersistenceMode::Durable => match FileStore::open(root) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(error = %e, "Durable store unavailable, using memory store");
                Arc::new(MemoryStore::new())
            }
        },
    }
}
