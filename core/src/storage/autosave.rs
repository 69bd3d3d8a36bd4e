//! Debounced snapshot writer.
//!
//! The latest snapshot sits in a `watch` channel. A background task waits
//! for a change, then restarts its timer on every further change until the
//! channel has been quiet for the debounce period, and writes whatever is
//! pending at that point. Only the newest snapshot is ever written.
//!
//! Taking the pending snapshot never notifies the channel, so the task only
//! wakes for real changes. Disk writes run on the blocking pool while the
//! write gate is held, so snapshots land in the order they were taken.

use std::sync::Arc;
use std::time::Duration;

use stormclock_types::EncounterState;
use tokio::sync::{Mutex, OwnedMutexGuard, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::EncounterPersistence;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(350);

type Pending = Arc<watch::Sender<Option<EncounterState>>>;

pub struct Autosaver {
    pending: Pending,
    persistence: EncounterPersistence,
    write_gate: Arc<Mutex<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Autosaver {
    /// Start the writer task. Must be called inside a tokio runtime.
    pub fn spawn(persistence: EncounterPersistence, debounce: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let pending = Arc::new(tx);
        let write_gate = Arc::new(Mutex::new(()));
        let handle = tokio::spawn(run(
            pending.clone(),
            rx,
            persistence.clone(),
            write_gate.clone(),
            debounce,
        ));
        Self {
            pending,
            persistence,
            write_gate,
            handle: Some(handle),
        }
    }

    /// Queue `state` for writing, replacing any snapshot still waiting.
    pub fn schedule(&self, state: EncounterState) {
        self.pending.send_replace(Some(state));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Write the pending snapshot now, after any write already in flight.
    /// Returns false if nothing was pending or the write failed.
    pub async fn flush(&self) -> bool {
        let gate = self.write_gate.clone().lock_owned().await;
        match take_pending(&self.pending) {
            Some(state) => write(self.persistence.clone(), state, gate).await,
            None => false,
        }
    }

    /// Stop the writer and drop any pending snapshot unwritten.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if take_pending(&self.pending).is_some() {
            debug!("Autosaver stopped with a pending snapshot discarded");
        }
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Remove the pending snapshot without waking receivers
fn take_pending(pending: &watch::Sender<Option<EncounterState>>) -> Option<EncounterState> {
    let mut taken = None;
    pending.send_if_modified(|slot| {
        taken = slot.take();
        false
    });
    taken
}

/// Save on the blocking pool. The gate is released once the file is written,
/// even if the awaiting task is aborted first.
async fn write(persistence: EncounterPersistence, state: EncounterState, gate: OwnedMutexGuard<()>) -> bool {
    let result = tokio::task::spawn_blocking(move || {
        let saved = persistence.save(&state.settings.storage_key, &state);
        drop(gate);
        saved
    })
    .await;

    match result {
        Ok(saved) => saved,
        Err(e) => {
            error!(error = %e, "Snapshot write task failed");
            false
        }
    }
}

async fn run(
    pending: Pending,
    mut rx: watch::Receiver<Option<EncounterState>>,
    persistence: EncounterPersistence,
    write_gate: Arc<Mutex<()>>,
    debounce: Duration,
) {
    loop {
        if rx.changed().await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(debounce) => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let gate = write_gate.clone().lock_owned().await;
        if let Some(state) = take_pending(&pending) {
            write(persistence.clone(), state, gate).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::storage::{KeyValueStore, MemoryStore, StoreError};

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl KeyValueStore for CountingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn setup() -> (Arc<CountingStore>, EncounterPersistence, Autosaver) {
        let store = Arc::new(CountingStore::default());
        let persistence = EncounterPersistence::new(store.clone());
        let saver = Autosaver::spawn(persistence.clone(), DEFAULT_DEBOUNCE);
        (store, persistence, saver)
    }

    fn state_at(round: u32) -> EncounterState {
        EncounterState {
            round,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_changes_coalesce_into_one_write() {
        let (store, persistence, saver) = setup();
        let key = state_at(1).settings.storage_key;

        for round in 1..=5 {
            saver.schedule(state_at(round));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(persistence.load(&key).map(|s| s.round), Some(5));
        assert!(!saver.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_discards_pending_write() {
        let (store, _, mut saver) = setup();
        saver.schedule(state_at(2));
        saver.shutdown();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert!(!saver.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn flush_writes_immediately_once() {
        let (store, persistence, saver) = setup();
        let key = state_at(1).settings.storage_key;

        saver.schedule(state_at(3));
        assert!(saver.flush().await);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(persistence.load(&key).map(|s| s.round), Some(3));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert!(!saver.flush().await);
    }

    #[tokio::test(start_paused = true)]
    async fn writes_go_to_the_snapshot_key() {
        let (_, persistence, saver) = setup();
        let mut state = state_at(4);
        state.settings.storage_key = "table-two".into();

        saver.schedule(state);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(persistence.load("table-two").map(|s| s.round), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn writer_goes_idle_after_a_write() {
        let (store, _, saver) = setup();
        saver.schedule(state_at(1));
        let mut watcher = saver.pending.subscribe();
        watcher.mark_unchanged();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        // taking the snapshot is not a change
        assert!(!watcher.has_changed().unwrap());

        assert!(!saver.flush().await);
        assert!(!watcher.has_changed().unwrap());
    }
}
