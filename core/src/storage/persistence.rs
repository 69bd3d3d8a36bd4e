use std::path::Path;
use std::sync::Arc;

use stormclock_types::{EncounterState, PersistenceMode};
use tracing::{debug, error, warn};

use super::{KeyValueStore, StoreError, open_store};
use crate::codec;

/// Loads and saves whole encounter snapshots. Never fails: problems are
/// logged and reported as "nothing loaded" or "not saved".
#[derive(Clone)]
pub struct EncounterPersistence {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for EncounterPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncounterPersistence").finish_non_exhaustive()
    }
}

impl EncounterPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Store for `mode`; durable snapshots live under `store_dir`
    pub fn for_mode(mode: PersistenceMode, store_dir: &Path) -> Self {
        Self::new(open_store(mode, store_dir))
    }

    /// Snapshot stored under `key`, or None if absent or unreadable.
    pub fn load(&self, key: &str) -> Option<EncounterState> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "No stored snapshot");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to read snapshot");
                return None;
            }
        };

        match codec::import_snapshot(raw.as_bytes()) {
            Ok(state) => {
                debug!(key, round = state.round, entities = state.entities.len(), "Snapshot loaded");
                Some(state)
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to load snapshot");
                None
            }
        }
    }

    pub fn try_save(&self, key: &str, state: &EncounterState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        self.store.set(key, &json)
    }

    /// Write `state` under `key`. Returns whether the write succeeded.
    pub fn save(&self, key: &str, state: &EncounterState) -> bool {
        match self.try_save(key, state) {
            Ok(()) => {
                debug!(key, round = state.round, "Snapshot saved");
                true
            }
            Err(e) => {
                error!(key, error = %e, "Failed to save snapshot");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::sample_state;
    use crate::storage::{FileStore, MemoryStore};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable {
                reason: "offline".into(),
            })
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable {
                reason: "offline".into(),
            })
        }
        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn save_then_load() {
        let persistence = EncounterPersistence::new(Arc::new(MemoryStore::new()));
        let state = sample_state(Default::default());
        assert!(persistence.save("k", &state));
        assert_eq!(persistence.load("k"), Some(state));
        assert_eq!(persistence.load("other"), None);
    }

    #[test]
    fn durable_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state(Default::default());
        {
            let store = FileStore::open(dir.path()).unwrap();
            EncounterPersistence::new(Arc::new(store)).save("enc", &state);
        }
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(EncounterPersistence::new(Arc::new(store)).load("enc"), Some(state));
    }

    #[test]
    fn volatile_mode_never_touches_disk() {
        let dir = tempfile::tempdir().unwrap();
        let state = sample_state(Default::default());

        let volatile = EncounterPersistence::for_mode(PersistenceMode::Volatile, dir.path());
        assert!(volatile.save("enc", &state));
        assert_eq!(volatile.load("enc"), Some(state.clone()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let durable = EncounterPersistence::for_mode(PersistenceMode::Durable, dir.path());
        assert_eq!(durable.load("enc"), None);
        assert!(durable.save("enc", &state));
        assert_eq!(durable.load("enc"), Some(state));
    }

    #[test]
    fn corrupt_snapshot_loads_as_none() {
        let store = Arc::new(MemoryStore::new());
        store.set("k", "{ definitely not a snapshot").unwrap();
        store.set("zero", r#"{"round":0,"phaseIndex":0}"#).unwrap();
        let persistence = EncounterPersistence::new(store);
        assert_eq!(persistence.load("k"), None);
        assert_eq!(persistence.load("zero"), None);
    }

    #[test]
    fn store_failures_are_swallowed() {
        let persistence = EncounterPersistence::new(Arc::new(BrokenStore));
        assert_eq!(persistence.load("k"), None);
        assert!(!persistence.save("k", &EncounterState::default()));
    }
}
