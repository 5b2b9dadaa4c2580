//! In-memory note store with active/trashed partitions.
//!
//! # Responsibility
//! - Keep both partitions in insertion order.
//! - Allocate placement handles (`NoteRef`) and resolve them.
//! - Report which partitions changed since the last drain.
//!
//! # Invariants
//! - A note lives in exactly one partition.
//! - Moves are append-then-remove; the source handle stops resolving.
//! - Operations on handles absent from the target partition are no-ops.
//! - `load_snapshot` replaces both partitions and never touches history.

use crate::model::note::{Note, NoteRef, Partition};
use crate::model::snapshot::{PersistedNote, Snapshot};
use log::debug;

/// One placed note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNote {
    pub note_ref: NoteRef,
    pub note: Note,
}

/// Partitions touched by mutations since the last [`NoteStore::take_changes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreChange {
    pub active: bool,
    pub trashed: bool,
}

impl StoreChange {
    pub fn touches(self, partition: Partition) -> bool {
        match partition {
            Partition::Active => self.active,
            Partition::Trashed => self.trashed,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.active && !self.trashed
    }

    fn mark(&mut self, partition: Partition) {
        match partition {
            Partition::Active => self.active = true,
            Partition::Trashed => self.trashed = true,
        }
    }
}

/// Ordered two-partition note collection.
#[derive(Debug, Default)]
pub struct NoteStore {
    active: Vec<StoredNote>,
    trashed: Vec<StoredNote>,
    next_ref: u64,
    changes: StoreChange,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new note at the tail of `partition`.
    pub fn append(
        &mut self,
        partition: Partition,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> NoteRef {
        self.append_note(partition, Note::new(title, content))
    }

    fn append_note(&mut self, partition: Partition, note: Note) -> NoteRef {
        self.next_ref += 1;
        let note_ref = NoteRef::from_raw(self.next_ref);
        self.partition_mut(partition)
            .push(StoredNote { note_ref, note });
        self.changes.mark(partition);
        note_ref
    }

    /// Removes `note_ref` from `partition` and returns the removed note.
    ///
    /// Returns `None` without side effects when the handle is not there.
    pub fn remove(&mut self, partition: Partition, note_ref: NoteRef) -> Option<Note> {
        let entries = self.partition_mut(partition);
        let index = entries.iter().position(|entry| entry.note_ref == note_ref)?;
        let removed = entries.remove(index);
        self.changes.mark(partition);
        Some(removed.note)
    }

    /// Moves one note between partitions by copy.
    ///
    /// Returns the handle of the new placement; callers must drop `note_ref`.
    pub fn move_note(
        &mut self,
        source: Partition,
        dest: Partition,
        note_ref: NoteRef,
    ) -> Option<NoteRef> {
        let note = self.get_in(source, note_ref)?.note.clone();
        let new_ref = self.append_note(dest, note);
        self.remove(source, note_ref);
        debug!(
            "event=note_move module=store status=ok from={} to={} old_ref={} new_ref={}",
            source.as_str(),
            dest.as_str(),
            note_ref,
            new_ref
        );
        Some(new_ref)
    }

    /// Ordered view of one partition.
    pub fn list(&self, partition: Partition) -> &[StoredNote] {
        match partition {
            Partition::Active => &self.active,
            Partition::Trashed => &self.trashed,
        }
    }

    pub fn len(&self, partition: Partition) -> usize {
        self.list(partition).len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.trashed.is_empty()
    }

    /// Resolves a handle in a specific partition.
    pub fn get_in(&self, partition: Partition, note_ref: NoteRef) -> Option<&StoredNote> {
        self.list(partition)
            .iter()
            .find(|entry| entry.note_ref == note_ref)
    }

    /// Resolves a handle in whichever partition holds it.
    pub fn get(&self, note_ref: NoteRef) -> Option<&StoredNote> {
        self.get_in(Partition::Active, note_ref)
            .or_else(|| self.get_in(Partition::Trashed, note_ref))
    }

    /// Partition currently holding `note_ref`.
    pub fn locate(&self, note_ref: NoteRef) -> Option<Partition> {
        [Partition::Active, Partition::Trashed]
            .into_iter()
            .find(|partition| self.get_in(*partition, note_ref).is_some())
    }

    /// Replaces note content in place and returns the previous content.
    pub fn set_content(&mut self, note_ref: NoteRef, content: impl Into<String>) -> Option<String> {
        let partition = self.locate(note_ref)?;
        let entry = self
            .partition_mut(partition)
            .iter_mut()
            .find(|entry| entry.note_ref == note_ref)?;
        let previous = std::mem::replace(&mut entry.note.content, content.into());
        self.changes.mark(partition);
        Some(previous)
    }

    /// Serializable copy of both partitions.
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            notes: self
                .active
                .iter()
                .map(|entry| PersistedNote::from(&entry.note))
                .collect(),
            trash: self
                .trashed
                .iter()
                .map(|entry| PersistedNote::from(&entry.note))
                .collect(),
        }
    }

    /// Replaces both partitions with `snapshot` contents.
    ///
    /// Handles from before the load stop resolving.
    pub fn load_snapshot(&mut self, snapshot: Snapshot) {
        self.active.clear();
        self.trashed.clear();
        for item in snapshot.notes {
            self.append_note(Partition::Active, item.into());
        }
        for item in snapshot.trash {
            self.append_note(Partition::Trashed, item.into());
        }
        self.changes.mark(Partition::Active);
        self.changes.mark(Partition::Trashed);
    }

    /// Returns and resets the accumulated change set.
    pub fn take_changes(&mut self) -> StoreChange {
        std::mem::take(&mut self.changes)
    }

    fn partition_mut(&mut self, partition: Partition) -> &mut Vec<StoredNote> {
        match partition {
            Partition::Active => &mut self.active,
            Partition::Trashed => &mut self.trashed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::model::note::{NoteRef, Partition};

    fn titles(store: &NoteStore, partition: Partition) -> Vec<String> {
        store
            .list(partition)
            .iter()
            .map(|entry| entry.note.title().to_string())
            .collect()
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut store = NoteStore::new();
        for title in ["c", "a", "b", "a"] {
            store.append(Partition::Active, title, "");
        }
        assert_eq!(titles(&store, Partition::Active), vec!["c", "a", "b", "a"]);
    }

    #[test]
    fn remove_keeps_remaining_order_and_ignores_unknown_refs() {
        let mut store = NoteStore::new();
        let first = store.append(Partition::Active, "1", "");
        let second = store.append(Partition::Active, "2", "");
        store.append(Partition::Active, "3", "");

        assert!(store.remove(Partition::Trashed, second).is_none());
        assert!(store.remove(Partition::Active, NoteRef::from(999)).is_none());
        assert!(store.remove(Partition::Active, second).is_some());
        assert_eq!(titles(&store, Partition::Active), vec!["1", "3"]);
        assert!(store.get(first).is_some());
    }

    #[test]
    fn move_allocates_new_ref_and_keeps_identity() {
        let mut store = NoteStore::new();
        let old_ref = store.append(Partition::Active, "Groceries", "milk, eggs");
        let id = store.get(old_ref).expect("placed").note.id;

        let new_ref = store
            .move_note(Partition::Active, Partition::Trashed, old_ref)
            .expect("move should succeed");

        assert_ne!(old_ref, new_ref);
        assert!(store.get(old_ref).is_none());
        let moved = store.get_in(Partition::Trashed, new_ref).expect("moved");
        assert_eq!(moved.note.id, id);
        assert_eq!(moved.note.content, "milk, eggs");
        assert!(store.list(Partition::Active).is_empty());
    }

    #[test]
    fn move_from_wrong_partition_is_noop() {
        let mut store = NoteStore::new();
        let note_ref = store.append(Partition::Active, "a", "b");
        store.take_changes();
        assert!(store
            .move_note(Partition::Trashed, Partition::Active, note_ref)
            .is_none());
        assert!(store.take_changes().is_empty());
        assert_eq!(store.locate(note_ref), Some(Partition::Active));
    }

    #[test]
    fn set_content_returns_previous_and_marks_partition() {
        let mut store = NoteStore::new();
        let note_ref = store.append(Partition::Trashed, "t", "old");
        store.take_changes();

        assert_eq!(store.set_content(note_ref, "new").as_deref(), Some("old"));
        let changes = store.take_changes();
        assert!(changes.touches(Partition::Trashed));
        assert!(!changes.touches(Partition::Active));
    }

    #[test]
    fn snapshot_load_replaces_partitions_with_fresh_refs() {
        let mut store = NoteStore::new();
        let stale = store.append(Partition::Active, "one", "1");
        store.append(Partition::Trashed, "two", "2");
        let snapshot = store.to_snapshot();

        let mut other = NoteStore::new();
        other.append(Partition::Active, "junk", "");
        other.load_snapshot(snapshot.clone());

        assert_eq!(other.to_snapshot(), snapshot);
        assert_eq!(titles(&other, Partition::Active), vec!["one"]);

        store.load_snapshot(snapshot);
        assert!(store.get(stale).is_none());
    }
}
