//! Snapshot persistence over a key-value store.
//!
//! # Responsibility
//! - Serialize both partitions into one JSON blob under a fixed key.
//! - Hydrate the store at startup from that blob.
//! - Debounce saves requested by edit actions.
//!
//! # Invariants
//! - Absent or malformed data is "no saved state", never a hard failure.
//! - Load replaces both partitions at once or leaves the store untouched.
//! - Storage failures are logged and never panic.

use crate::model::snapshot::Snapshot;
use crate::repo::kv_store::{KeyValueStore, KvError};
use crate::repo::note_store::NoteStore;
use crate::service::debounce::SaveDebouncer;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

/// Fixed key holding the persisted snapshot.
pub const STORAGE_KEY: &str = "notiva:data";
/// Quiet period before a requested save is written.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Persistence failure.
#[derive(Debug)]
pub enum PersistenceError {
    Storage(KvError),
    Encode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<KvError> for PersistenceError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Reads and writes the note snapshot.
pub struct PersistenceAdapter<S: KeyValueStore> {
    kv: S,
    debouncer: SaveDebouncer,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    /// Creates an adapter with the default debounce window.
    pub fn new(kv: S) -> Self {
        Self::with_debounce(kv, SAVE_DEBOUNCE)
    }

    pub fn with_debounce(kv: S, delay: Duration) -> Self {
        Self {
            kv,
            debouncer: SaveDebouncer::new(delay),
        }
    }

    /// Writes `store` immediately.
    pub fn save(&mut self, store: &NoteStore) -> Result<(), PersistenceError> {
        let snapshot = store.to_snapshot();
        let raw = serde_json::to_string(&snapshot)?;
        self.kv.set(STORAGE_KEY, &raw)?;
        info!(
            "event=snapshot_save module=persistence status=ok notes={} trash={} bytes={}",
            snapshot.notes.len(),
            snapshot.trash.len(),
            raw.len()
        );
        Ok(())
    }

    /// Writes `store` immediately, logging instead of returning failures.
    ///
    /// Returns whether the write succeeded.
    pub fn save_or_log(&mut self, store: &NoteStore) -> bool {
        match self.save(store) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=snapshot_save module=persistence status=error error={}",
                    err
                );
                false
            }
        }
    }

    /// Reads the persisted snapshot.
    ///
    /// Returns `None` when nothing usable is stored.
    pub fn load(&self) -> Option<Snapshot> {
        let raw = match self.kv.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("event=snapshot_load module=persistence status=empty");
                return None;
            }
            Err(err) => {
                error!(
                    "event=snapshot_load module=persistence status=error error_code=read_failed error={}",
                    err
                );
                return None;
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => {
                info!(
                    "event=snapshot_load module=persistence status=ok notes={} trash={}",
                    snapshot.notes.len(),
                    snapshot.trash.len()
                );
                Some(snapshot)
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=persistence status=error error_code=malformed bytes={} error={}",
                    raw.len(),
                    err
                );
                None
            }
        }
    }

    /// Replaces `store` contents with the persisted snapshot, if any.
    pub fn hydrate(&self, store: &mut NoteStore) -> bool {
        match self.load() {
            Some(snapshot) => {
                store.load_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Schedules a deferred save, replacing any pending one.
    pub fn request_save(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    /// Writes `store` if the pending deadline has passed.
    ///
    /// Returns whether a write was attempted.
    pub fn flush_due(&mut self, now: Instant, store: &NoteStore) -> bool {
        if !self.debouncer.fire_if_due(now) {
            return false;
        }
        self.save_or_log(store);
        true
    }

    /// Cancels the pending deferred save and writes now.
    pub fn sync_now(&mut self, store: &NoteStore) -> bool {
        self.debouncer.cancel();
        self.save_or_log(store)
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Deadline of the pending deferred save.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }
}

#[cfg(test)]
mod tests {
    use super::{PersistenceAdapter, STORAGE_KEY};
    use crate::model::note::Partition;
    use crate::repo::kv_store::{KeyValueStore, KvError, KvResult, MemoryKeyValueStore};
    use crate::repo::note_store::NoteStore;
    use std::time::{Duration, Instant};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> KvResult<Option<String>> {
            Err(KvError::Unavailable("disk gone".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> KvResult<()> {
            Err(KvError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&mut self, _key: &str) -> KvResult<()> {
            Ok(())
        }
    }

    #[test]
    fn save_then_hydrate_restores_both_partitions() {
        let mut store = NoteStore::new();
        store.append(Partition::Active, "keep", "1");
        store.append(Partition::Trashed, "bin", "2");

        let mut adapter = PersistenceAdapter::new(MemoryKeyValueStore::new());
        adapter.save(&store).unwrap();

        let mut restored = NoteStore::new();
        assert!(adapter.hydrate(&mut restored));
        assert_eq!(restored.to_snapshot(), store.to_snapshot());
    }

    #[test]
    fn malformed_blob_is_treated_as_absent() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set(STORAGE_KEY, r#"{"notes": "nope"}"#).unwrap();
        let adapter = PersistenceAdapter::new(kv);

        let mut store = NoteStore::new();
        store.append(Partition::Active, "untouched", "");
        assert!(!adapter.hydrate(&mut store));
        assert_eq!(store.len(Partition::Active), 1);
    }

    #[test]
    fn storage_failures_are_not_fatal() {
        let mut adapter = PersistenceAdapter::new(BrokenStore);
        let store = NoteStore::new();
        assert!(!adapter.save_or_log(&store));
        assert!(adapter.load().is_none());
    }

    #[test]
    fn debounced_save_writes_last_state_once() {
        let mut adapter =
            PersistenceAdapter::with_debounce(MemoryKeyValueStore::new(), Duration::from_millis(300));
        let mut store = NoteStore::new();
        let start = Instant::now();

        store.append(Partition::Active, "first", "");
        adapter.request_save(start);
        store.append(Partition::Active, "second", "");
        adapter.request_save(start + Duration::from_millis(100));

        assert!(!adapter.flush_due(start + Duration::from_millis(300), &store));
        assert!(adapter.kv().get(STORAGE_KEY).unwrap().is_none());

        assert!(adapter.flush_due(start + Duration::from_millis(400), &store));
        let raw = adapter.kv().get(STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["notes"].as_array().unwrap().len(), 2);
        assert_eq!(value["trash"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn sync_now_cancels_pending_save() {
        let mut adapter = PersistenceAdapter::new(MemoryKeyValueStore::new());
        let store = NoteStore::new();
        adapter.request_save(Instant::now());
        assert!(adapter.sync_now(&store));
        assert!(!adapter.has_pending_save());
    }
}
