//! Interaction controller: user intents mapped onto store, history, view
//! and persistence.
//!
//! # Responsibility
//! - Own the whole widget state (no module globals).
//! - Run every intent to completion and re-render the visible partition.
//! - Route confirmations and acknowledgements through [`Prompt`].
//!
//! # Invariants
//! - Moving or permanently deleting a note purges its history entries.
//! - Declined confirmations and rejected input leave state untouched.
//! - Closing the editor without saving has no side effects.
//! - Every successful store mutation schedules a debounced save.

use crate::history::EditHistory;
use crate::model::note::{NoteDraft, NoteRef, Partition, View};
use crate::repo::kv_store::KeyValueStore;
use crate::repo::note_store::NoteStore;
use crate::search::filter::SearchQuery;
use crate::service::keymap::{shortcut_for, KeyChord, Shortcut};
use crate::service::persistence::PersistenceAdapter;
use crate::view::render::{render, NoteCard};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Confirmation shown before moving a note to trash.
pub const CONFIRM_TRASH: &str = "Move this note to Trash?";
/// Confirmation shown before permanent deletion.
pub const CONFIRM_DELETE_PERMANENTLY: &str = "Permanently delete this note?";
/// Acknowledgement shown after a manual sync.
pub const SYNC_ACKNOWLEDGEMENT: &str = "Synced (saved to local storage).";

/// Blocking dialogs supplied by the front-end.
pub trait Prompt {
    /// Yes/no question. `true` means the user agreed.
    fn confirm(&mut self, message: &str) -> bool;
    /// Message the user has to dismiss.
    fn acknowledge(&mut self, message: &str);
}

/// Result of one intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State changed.
    Applied,
    /// The user declined a confirmation.
    Declined,
    /// Input or history state rejected the intent; the user was told.
    Rejected,
    /// The target no longer exists or the intent does not apply here.
    Ignored,
    /// The storage write failed; the failure was logged.
    Failed,
}

/// Editor misuse reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorError {
    /// The editor is closed.
    NotOpen,
    /// Titles cannot change after creation.
    TitleLocked,
    /// The handle does not name an active note.
    NoteNotFound(NoteRef),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen => write!(f, "editor is not open"),
            Self::TitleLocked => write!(f, "title cannot be changed while editing a note"),
            Self::NoteNotFound(note_ref) => write!(f, "note not found: {note_ref}"),
        }
    }
}

impl Error for EditorError {}

/// Modal editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    open: bool,
    editing: Option<NoteRef>,
    title: String,
    content: String,
}

impl EditorState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Note being edited; `None` while composing a new note.
    pub fn editing(&self) -> Option<NoteRef> {
        self.editing
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Title field is disabled while editing an existing note.
    pub fn title_locked(&self) -> bool {
        self.editing.is_some()
    }
}

/// Sidebar menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub view: View,
    pub label: &'static str,
    pub active: bool,
}

/// Explicit application state for the notes widget.
pub struct InteractionController<S: KeyValueStore> {
    store: NoteStore,
    history: EditHistory,
    persistence: PersistenceAdapter<S>,
    view: View,
    query: SearchQuery,
    editor: EditorState,
    sidebar_expanded: bool,
    cards: Vec<NoteCard>,
}

impl<S: KeyValueStore> InteractionController<S> {
    /// Creates an empty controller over `kv` with the default debounce window.
    pub fn new(kv: S) -> Self {
        Self::with_persistence(PersistenceAdapter::new(kv))
    }

    pub fn with_persistence(persistence: PersistenceAdapter<S>) -> Self {
        Self {
            store: NoteStore::new(),
            history: EditHistory::new(),
            persistence,
            view: View::Notes,
            query: SearchQuery::default(),
            editor: EditorState::default(),
            sidebar_expanded: true,
            cards: Vec::new(),
        }
    }

    /// Hydrates from storage and renders the notes list.
    ///
    /// Returns whether saved state was found.
    pub fn start(&mut self) -> bool {
        let restored = self.persistence.hydrate(&mut self.store);
        self.history.clear();
        self.view = View::Notes;
        self.store.take_changes();
        self.rerender();
        info!(
            "event=widget_start module=controller status=ok restored={} notes={} trash={}",
            restored,
            self.store.len(Partition::Active),
            self.store.len(Partition::Trashed)
        );
        restored
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Cards of the last render pass.
    pub fn cards(&self) -> &[NoteCard] {
        &self.cards
    }

    pub fn is_sidebar_expanded(&self) -> bool {
        self.sidebar_expanded
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_expanded = !self.sidebar_expanded;
    }

    /// Sidebar items with the current view highlighted.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        View::ALL
            .into_iter()
            .map(|view| MenuItem {
                view,
                label: view.label(),
                active: view == self.view,
            })
            .collect()
    }

    /// Selects a sidebar item. Store and history are untouched.
    pub fn switch_view(&mut self, view: View) {
        self.view = view;
        self.rerender();
    }

    /// Applies search-box input to the visible partition.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.query = SearchQuery::new(text);
        self.rerender();
    }

    /// Opens an empty editor for a new note.
    pub fn open_new_note(&mut self) {
        self.editor = EditorState {
            open: true,
            ..EditorState::default()
        };
    }

    /// Opens the editor pre-filled with an active note, title locked.
    pub fn open_edit(&mut self, note_ref: NoteRef) -> Result<(), EditorError> {
        let entry = self
            .store
            .get_in(Partition::Active, note_ref)
            .ok_or(EditorError::NoteNotFound(note_ref))?;
        self.editor = EditorState {
            open: true,
            editing: Some(note_ref),
            title: entry.note.title().to_string(),
            content: entry.note.content.clone(),
        };
        Ok(())
    }

    /// Discards the editor contents.
    pub fn close_editor(&mut self) {
        self.editor = EditorState::default();
    }

    pub fn set_editor_title(&mut self, title: impl Into<String>) -> Result<(), EditorError> {
        if !self.editor.open {
            return Err(EditorError::NotOpen);
        }
        if self.editor.title_locked() {
            return Err(EditorError::TitleLocked);
        }
        self.editor.title = title.into();
        Ok(())
    }

    pub fn set_editor_content(&mut self, content: impl Into<String>) -> Result<(), EditorError> {
        if !self.editor.open {
            return Err(EditorError::NotOpen);
        }
        self.editor.content = content.into();
        Ok(())
    }

    /// Saves the editor: creates a note or records a content edit.
    pub fn save_editor(&mut self, prompt: &mut dyn Prompt) -> Outcome {
        if !self.editor.open {
            return Outcome::Ignored;
        }

        let draft = NoteDraft::new(&self.editor.title, &self.editor.content);
        if let Err(err) = draft.validate() {
            prompt.acknowledge(&err.to_string());
            return Outcome::Rejected;
        }

        let outcome = match self.editor.editing {
            Some(note_ref) => match self.store.set_content(note_ref, draft.content) {
                Some(previous) => {
                    self.history.record_edit(note_ref, previous);
                    info!(
                        "event=note_edit module=controller status=ok note_ref={}",
                        note_ref
                    );
                    Outcome::Applied
                }
                None => {
                    warn!(
                        "event=note_edit module=controller status=skipped reason=stale_ref note_ref={}",
                        note_ref
                    );
                    Outcome::Ignored
                }
            },
            None => {
                let title = draft.effective_title().to_string();
                let note_ref = self.store.append(Partition::Active, title, draft.content);
                self.history.clear_redo();
                info!(
                    "event=note_create module=controller status=ok note_ref={}",
                    note_ref
                );
                Outcome::Applied
            }
        };

        self.close_editor();
        self.after_mutation(outcome);
        outcome
    }

    /// Moves an active note to trash after confirmation.
    pub fn trash(&mut self, note_ref: NoteRef, prompt: &mut dyn Prompt) -> Outcome {
        if self.store.get_in(Partition::Active, note_ref).is_none() {
            return Outcome::Ignored;
        }
        if !prompt.confirm(CONFIRM_TRASH) {
            return Outcome::Declined;
        }
        let outcome = self.relocate(note_ref, Partition::Active, Partition::Trashed);
        self.after_mutation(outcome);
        outcome
    }

    /// Moves a trashed note back to the active list.
    pub fn restore(&mut self, note_ref: NoteRef) -> Outcome {
        let outcome = self.relocate(note_ref, Partition::Trashed, Partition::Active);
        self.after_mutation(outcome);
        outcome
    }

    /// Removes a trashed note for good after confirmation.
    pub fn delete_permanently(&mut self, note_ref: NoteRef, prompt: &mut dyn Prompt) -> Outcome {
        if self.store.get_in(Partition::Trashed, note_ref).is_none() {
            return Outcome::Ignored;
        }
        if !prompt.confirm(CONFIRM_DELETE_PERMANENTLY) {
            return Outcome::Declined;
        }
        self.store.remove(Partition::Trashed, note_ref);
        self.forget(note_ref);
        info!(
            "event=note_purge module=controller status=ok note_ref={}",
            note_ref
        );
        self.after_mutation(Outcome::Applied);
        Outcome::Applied
    }

    /// Reverts the latest content edit.
    pub fn undo(&mut self, prompt: &mut dyn Prompt) -> Outcome {
        let result = self.history.undo(&mut self.store);
        self.finish_replay(result, prompt)
    }

    /// Re-applies the latest undone edit.
    pub fn redo(&mut self, prompt: &mut dyn Prompt) -> Outcome {
        let result = self.history.redo(&mut self.store);
        self.finish_replay(result, prompt)
    }

    /// Dispatches a global key press.
    ///
    /// Returns `true` when the chord was handled and the platform default
    /// must be suppressed.
    pub fn handle_key(&mut self, chord: &KeyChord, prompt: &mut dyn Prompt) -> bool {
        match shortcut_for(chord) {
            Some(Shortcut::Undo) => {
                self.undo(prompt);
                true
            }
            Some(Shortcut::Redo) => {
                self.redo(prompt);
                true
            }
            None => false,
        }
    }

    /// Saves immediately, bypassing the debounce window.
    pub fn sync(&mut self, prompt: &mut dyn Prompt) -> Outcome {
        let ok = self.persistence.sync_now(&self.store);
        prompt.acknowledge(SYNC_ACKNOWLEDGEMENT);
        if ok {
            Outcome::Applied
        } else {
            Outcome::Failed
        }
    }

    /// Writes the pending debounced save once its deadline has passed.
    pub fn flush_pending_save(&mut self, now: Instant) -> bool {
        self.persistence.flush_due(now, &self.store)
    }

    fn relocate(&mut self, note_ref: NoteRef, from: Partition, to: Partition) -> Outcome {
        match self.store.move_note(from, to, note_ref) {
            Some(new_ref) => {
                self.forget(note_ref);
                info!(
                    "event=note_move module=controller status=ok from={} to={} note_ref={} new_ref={}",
                    from.as_str(),
                    to.as_str(),
                    note_ref,
                    new_ref
                );
                Outcome::Applied
            }
            None => Outcome::Ignored,
        }
    }

    fn forget(&mut self, note_ref: NoteRef) {
        self.history.purge_references(note_ref);
        if self.editor.editing == Some(note_ref) {
            self.close_editor();
        }
    }

    fn finish_replay<E: Display>(
        &mut self,
        result: Result<NoteRef, E>,
        prompt: &mut dyn Prompt,
    ) -> Outcome {
        match result {
            Ok(_) => {
                self.after_mutation(Outcome::Applied);
                Outcome::Applied
            }
            Err(err) => {
                prompt.acknowledge(&err.to_string());
                Outcome::Rejected
            }
        }
    }

    fn after_mutation(&mut self, outcome: Outcome) {
        if outcome == Outcome::Applied {
            self.persistence.request_save(Instant::now());
        }
        let changes = self.store.take_changes();
        if let Some(partition) = self.view.partition() {
            if changes.touches(partition) {
                self.rerender();
            }
        }
    }

    fn rerender(&mut self) {
        self.cards = match self.view.partition() {
            Some(partition) => render(&self.store, partition, &self.query),
            None => Vec::new(),
        };
    }
}
