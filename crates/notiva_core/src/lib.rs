//! Core domain logic for the Notiva notes widget.
//! This crate is the single source of truth for widget state and invariants.

pub mod config;
pub mod db;
pub mod history;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod view;

pub use config::{ConfigError, NotivaConfig};
pub use history::{EditHistory, HistoryEntry, HistoryError, HISTORY_LIMIT};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteDraft, NoteId, NoteRef, NoteValidationError, Partition, View};
pub use model::snapshot::{PersistedNote, Snapshot};
pub use repo::kv_store::{
    KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore,
};
pub use repo::note_store::{NoteStore, StoreChange, StoredNote};
pub use search::filter::SearchQuery;
pub use service::controller::{
    EditorError, EditorState, InteractionController, MenuItem, Outcome, Prompt,
};
pub use service::keymap::{shortcut_for, KeyChord, Shortcut};
pub use service::persistence::{PersistenceAdapter, PersistenceError, SAVE_DEBOUNCE, STORAGE_KEY};
pub use view::render::{escape_html, render, render_html, CardAction, NoteCard};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
