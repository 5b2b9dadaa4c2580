//! Undo/redo of note content edits.
//!
//! # Responsibility
//! - Record content edits and replay them backwards or forwards.
//! - Evict entries whose note placement is gone.
//!
//! # Invariants
//! - A new forward edit or a note creation clears the redo stack.
//! - An entry lives on at most one stack at any time.
//! - Stacks hold at most `HISTORY_LIMIT` entries; the oldest is evicted.
//! - Only content is replayed; titles, creation and moves are not undoable.

use crate::model::note::NoteRef;
use crate::repo::note_store::NoteStore;
use log::{debug, warn};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum entries kept per stack.
pub const HISTORY_LIMIT: usize = 100;

/// One recorded edit: the note and its content before the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub note_ref: NoteRef,
    pub previous_content: String,
}

/// Reported when there is nothing to replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    NothingToUndo,
    NothingToRedo,
}

impl Display for HistoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToUndo => write!(f, "Nothing to undo."),
            Self::NothingToRedo => write!(f, "Nothing to redo."),
        }
    }
}

impl Error for HistoryError {}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Undo,
    Redo,
}

/// Bounded undo and redo stacks.
#[derive(Debug, Default)]
pub struct EditHistory {
    undo: VecDeque<HistoryEntry>,
    redo: VecDeque<HistoryEntry>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a forward edit and invalidates redo.
    pub fn record_edit(&mut self, note_ref: NoteRef, previous_content: impl Into<String>) {
        push_bounded(
            &mut self.undo,
            HistoryEntry {
                note_ref,
                previous_content: previous_content.into(),
            },
        );
        self.redo.clear();
    }

    /// Reverts the latest edit and returns the affected note.
    pub fn undo(&mut self, store: &mut NoteStore) -> Result<NoteRef, HistoryError> {
        self.replay(store, Direction::Undo)
            .ok_or(HistoryError::NothingToUndo)
    }

    /// Re-applies the latest undone edit and returns the affected note.
    pub fn redo(&mut self, store: &mut NoteStore) -> Result<NoteRef, HistoryError> {
        self.replay(store, Direction::Redo)
            .ok_or(HistoryError::NothingToRedo)
    }

    /// Drops every entry on either stack that names `note_ref`.
    pub fn purge_references(&mut self, note_ref: NoteRef) {
        let before = self.undo.len() + self.redo.len();
        self.undo.retain(|entry| entry.note_ref != note_ref);
        self.redo.retain(|entry| entry.note_ref != note_ref);
        let purged = before - self.undo.len() - self.redo.len();
        if purged > 0 {
            debug!(
                "event=history_purge module=history status=ok note_ref={} purged={}",
                note_ref, purged
            );
        }
    }

    /// Invalidates redo without touching undo; called when a note is created.
    pub fn clear_redo(&mut self) {
        self.redo.clear();
    }

    /// Clears both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Whether any entry on either stack names `note_ref`.
    pub fn references(&self, note_ref: NoteRef) -> bool {
        self.undo
            .iter()
            .chain(self.redo.iter())
            .any(|entry| entry.note_ref == note_ref)
    }

    fn replay(&mut self, store: &mut NoteStore, direction: Direction) -> Option<NoteRef> {
        let (from, to) = match direction {
            Direction::Undo => (&mut self.undo, &mut self.redo),
            Direction::Redo => (&mut self.redo, &mut self.undo),
        };

        while let Some(entry) = from.pop_back() {
            match store.set_content(entry.note_ref, entry.previous_content) {
                Some(current) => {
                    push_bounded(
                        to,
                        HistoryEntry {
                            note_ref: entry.note_ref,
                            previous_content: current,
                        },
                    );
                    return Some(entry.note_ref);
                }
                None => warn!(
                    "event=history_replay module=history status=skipped reason=stale_ref note_ref={}",
                    entry.note_ref
                ),
            }
        }
        None
    }
}

fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry) {
    if stack.len() == HISTORY_LIMIT {
        stack.pop_front();
    }
    stack.push_back(entry);
}

#[cfg(test)]
mod tests {
    use super::{EditHistory, HistoryError, HISTORY_LIMIT};
    use crate::model::note::{NoteRef, Partition};
    use crate::repo::note_store::NoteStore;

    fn edit(store: &mut NoteStore, history: &mut EditHistory, note_ref: NoteRef, content: &str) {
        let previous = store.set_content(note_ref, content).expect("note present");
        history.record_edit(note_ref, previous);
    }

    fn content(store: &NoteStore, note_ref: NoteRef) -> String {
        store.get(note_ref).expect("note present").note.content.clone()
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut store = NoteStore::new();
        let mut history = EditHistory::new();
        let note = store.append(Partition::Active, "A", "v1");

        edit(&mut store, &mut history, note, "v2");
        assert_eq!(history.undo(&mut store), Ok(note));
        assert_eq!(content(&store, note), "v1");
        assert_eq!(history.redo(&mut store), Ok(note));
        assert_eq!(content(&store, note), "v2");
    }

    #[test]
    fn clear_redo_keeps_undo_stack() {
        let mut store = NoteStore::new();
        let mut history = EditHistory::new();
        let note = store.append(Partition::Active, "A", "v1");
        edit(&mut store, &mut history, note, "v2");
        edit(&mut store, &mut history, note, "v3");
        history.undo(&mut store).unwrap();
        assert_eq!(history.redo_len(), 1);

        history.clear_redo();
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo(&mut store), Err(HistoryError::NothingToRedo));
        assert_eq!(content(&store, note), "v2");
    }

    #[test]
    fn n_edits_then_n_undos_restore_original() {
        let mut store = NoteStore::new();
        let mut history = EditHistory::new();
        let note = store.append(Partition::Active, "A", "start");

        for step in 0..5 {
            edit(&mut store, &mut history, note, &format!("step {step}"));
        }
        for _ in 0..5 {
            history.undo(&mut store).unwrap();
        }
        assert_eq!(content(&store, note), "start");
        assert_eq!(history.undo(&mut store), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn new_edit_invalidates_redo() {
        let mut store = NoteStore::new();
        let mut history = EditHistory::new();
        let note = store.append(Partition::Active, "A", "v1");

        edit(&mut store, &mut history, note, "v2");
        history.undo(&mut store).unwrap();
        assert!(history.can_redo());

        edit(&mut store, &mut history, note, "v3");
        assert_eq!(history.redo(&mut store), Err(HistoryError::NothingToRedo));
        assert_eq!(content(&store, note), "v3");
    }

    #[test]
    fn purge_removes_entries_from_both_stacks() {
        let mut store = NoteStore::new();
        let mut history = EditHistory::new();
        let moved = store.append(Partition::Active, "moved", "a");
        let kept = store.append(Partition::Active, "kept", "x");

        edit(&mut store, &mut history, moved, "b");
        edit(&mut store, &mut history, moved, "c");
        history.undo(&mut store).unwrap();
        edit(&mut store, &mut history, kept, "y");

        let new_ref = store
            .move_note(Partition::Active, Partition::Trashed, moved)
            .unwrap();
        history.purge_references(moved);

        assert!(!history.references(moved));
        assert_eq!(history.undo(&mut store), Ok(kept));
        assert_eq!(history.undo(&mut store), Err(HistoryError::NothingToUndo));
        assert_eq!(content(&store, new_ref), "b");
    }

    #[test]
    fn stale_entries_are_skipped() {
        let mut store = NoteStore::new();
        let mut history = EditHistory::new();
        let live = store.append(Partition::Active, "live", "1");
        let gone = store.append(Partition::Active, "gone", "1");

        edit(&mut store, &mut history, live, "2");
        edit(&mut store, &mut history, gone, "2");
        store.remove(Partition::Active, gone);

        assert_eq!(history.undo(&mut store), Ok(live));
        assert_eq!(content(&store, live), "1");
    }

    #[test]
    fn stacks_are_bounded() {
        let mut store = NoteStore::new();
        let mut history = EditHistory::new();
        let note = store.append(Partition::Active, "A", "0");

        for step in 0..HISTORY_LIMIT + 10 {
            edit(&mut store, &mut history, note, &step.to_string());
        }
        assert_eq!(history.undo_len(), HISTORY_LIMIT);
    }
}
