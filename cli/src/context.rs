use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use stormclock_core::context::ConfigError;
use stormclock_core::encounter::{EncounterTracker, ReplaceReason};
use stormclock_core::storage::{self, Autosaver, EncounterPersistence};
use stormclock_core::{AppConfigExt, DirectoryContent, sample_state};
use stormclock_types::{AppConfig, EncounterState};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::feedback::Feedback;

/// Where a session reads its config and keeps durable snapshots.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub config_file: PathBuf,
    pub store_dir: PathBuf,
}

impl SessionPaths {
    /// Platform config file and data directory
    pub fn platform() -> Self {
        let config_file = AppConfig::default_path().unwrap_or_else(|e| {
            warn!(error = %e, "No platform config directory, using working directory");
            PathBuf::from("stormclock.toml")
        });
        Self {
            config_file,
            store_dir: storage::store_dir(),
        }
    }

    /// Config and store both under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_file: dir.join("config.toml"),
            store_dir: dir.join("store"),
        }
    }
}

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the tracker and stores.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    paths: SessionPaths,
    tracker: Arc<RwLock<EncounterTracker>>,
    autosaver: Arc<Mutex<Autosaver>>,
    persistence: EncounterPersistence,
    content: Arc<DirectoryContent>,
}

impl CliContext {
    /// Open the encounter the stored config points at, or start a fresh one.
    /// Must be called from inside the tokio runtime.
    pub fn open(paths: SessionPaths) -> Self {
        let config = AppConfig::load_from(&paths.config_file);
        let settings = config.encounter_settings();
        let persistence = EncounterPersistence::for_mode(settings.persistence_mode, &paths.store_dir);

        let state = match persistence.load(&settings.storage_key) {
            Some(mut state) => {
                info!(key = %settings.storage_key, round = state.round, "Resumed stored encounter");
                state.settings.persistence_mode = settings.persistence_mode;
                state.settings.storage_key = settings.storage_key;
                state
            }
            None if config.start_with_sample => sample_state(settings),
            None => EncounterState::new(settings),
        };

        let mut tracker = EncounterTracker::new(state);
        tracker.subscribe(Feedback);

        let autosaver = Autosaver::spawn(
            persistence.clone(),
            Duration::from_millis(config.autosave_debounce_ms),
        );
        let content = DirectoryContent::new(&config.content_directory);

        Self {
            config: Arc::new(RwLock::new(config)),
            paths,
            tracker: Arc::new(RwLock::new(tracker)),
            autosaver: Arc::new(Mutex::new(autosaver)),
            persistence,
            content: Arc::new(content),
        }
    }

    /// Run a mutation against the tracker and queue an autosave if the
    /// encounter changed.
    pub async fn apply<R>(&self, f: impl FnOnce(&mut EncounterTracker) -> R) -> R {
        let mut tracker = self.tracker.write().await;
        let before = tracker.state().clone();
        let result = f(&mut *tracker);
        if tracker.state() != &before {
            self.autosaver.lock().await.schedule(tracker.state().clone());
        }
        result
    }

    pub async fn read<R>(&self, f: impl FnOnce(&EncounterTracker) -> R) -> R {
        let tracker = self.tracker.read().await;
        f(&*tracker)
    }

    /// Change the stored config and write it to the session's config file.
    pub async fn update_config(&self, f: impl FnOnce(&mut AppConfig)) -> Result<(), ConfigError> {
        let mut config = self.config.write().await;
        f(&mut *config);
        config.save_to(&self.paths.config_file)
    }

    /// Replace the encounter with the snapshot stored under `key`, if any.
    pub async fn reload(&self, key: &str) -> bool {
        match self.persistence.load(key) {
            Some(state) => {
                self.apply(|t| t.replace_state(state, ReplaceReason::Reload)).await;
                true
            }
            None => false,
        }
    }

    pub fn content(&self) -> &DirectoryContent {
        &self.content
    }

    /// Write any pending snapshot and stop the autosaver.
    pub async fn shutdown(&self) {
        let mut autosaver = self.autosaver.lock().await;
        if autosaver.flush().await {
            info!("Pending snapshot written on exit");
        }
        autosaver.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{self, KindArg, ModeArg};
    use stormclock_types::{DEFAULT_STORAGE_KEY, PersistenceMode};

    fn has_entity(state: &EncounterState, name: &str) -> bool {
        state.entities.iter().any(|e| e.name == name)
    }

    #[tokio::test]
    async fn volatile_mode_is_used_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SessionPaths::in_dir(dir.path());

        let first = CliContext::open(paths.clone());
        commands::set_persistence_mode(&first, ModeArg::Volatile).await.unwrap();
        first.shutdown().await;

        let second = CliContext::open(paths.clone());
        let mode = second.read(|t| t.settings().persistence_mode).await;
        assert_eq!(mode, PersistenceMode::Volatile);
        commands::add(&second, "Syl", KindArg::Ally, false, false, None).await.unwrap();
        second.shutdown().await;

        let durable = EncounterPersistence::for_mode(PersistenceMode::Durable, &paths.store_dir);
        let stored = durable.load(DEFAULT_STORAGE_KEY);
        assert!(!stored.is_some_and(|s| has_entity(&s, "Syl")));
    }

    #[tokio::test]
    async fn storage_key_is_used_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SessionPaths::in_dir(dir.path());

        let first = CliContext::open(paths.clone());
        commands::set_storage_key(&first, "table-two").await.unwrap();
        commands::add(&first, "Navani", KindArg::Player, false, false, None).await.unwrap();
        first.shutdown().await;

        let second = CliContext::open(paths);
        let (key, navani) = second
            .read(|t| (t.settings().storage_key.clone(), has_entity(t.state(), "Navani")))
            .await;
        assert_eq!(key, "table-two");
        assert!(navani);
        second.shutdown().await;
    }
}
