//! FFI use-case API for the Flutter widget shell.
//!
//! # Responsibility
//! - Expose widget intents to Dart via FRB as sync calls.
//! - Own the single process-wide widget session.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every widget call returns the freshly rendered visible partition.
//! - Confirmations are answered by the Dart side before the call
//!   (`confirmed` argument); acknowledgements are returned as `messages`.

use log::{error, warn};
use notiva_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CardAction, InteractionController, KeyChord, NoteCard, NoteRef, NotivaConfig, Outcome,
    PersistenceAdapter, Prompt, SqliteKeyValueStore, View,
};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

type Session = InteractionController<SqliteKeyValueStore>;

static SESSION: OnceLock<Result<Mutex<Session>, String>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One note card as shown by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetCard {
    /// Handle to pass back into card actions.
    pub note_ref: u64,
    /// HTML-escaped title.
    pub title: String,
    /// HTML-escaped content.
    pub content: String,
    /// Action ids (`edit|delete|restore|delete_permanently`).
    pub actions: Vec<String>,
}

/// Editor modal snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEditor {
    pub open: bool,
    pub title_locked: bool,
    pub title: String,
    pub content: String,
}

/// Response envelope for every widget call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetResponse {
    /// Whether the call reached the session.
    pub ok: bool,
    /// `applied|declined|rejected|ignored|failed`, or a call-specific status
    /// such as `sync_failed`.
    pub outcome: String,
    /// Acknowledgements the UI must show, in order.
    pub messages: Vec<String>,
    /// Current sidebar label.
    pub view: String,
    /// Rendered cards of the visible partition.
    pub cards: Vec<WidgetCard>,
    pub editor: WidgetEditor,
}

impl WidgetResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            outcome: "error".to_string(),
            messages: vec![message.into()],
            view: String::new(),
            cards: Vec::new(),
            editor: WidgetEditor {
                open: false,
                title_locked: false,
                title: String::new(),
                content: String::new(),
            },
        }
    }
}

/// Renders the visible partition without changing state.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_render() -> WidgetResponse {
    with_session(false, |_, _| "rendered".to_string())
}

/// Selects a sidebar item by label (`Notes List`, `Trash`, `Archive`).
#[flutter_rust_bridge::frb(sync)]
pub fn widget_switch_view(label: String) -> WidgetResponse {
    with_session(false, |session, _| match View::from_label(&label) {
        Some(view) => {
            session.switch_view(view);
            "switched".to_string()
        }
        None => "unknown_view".to_string(),
    })
}

/// Re-filters the visible partition with search-box input.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_search(query: String) -> WidgetResponse {
    with_session(false, |session, _| {
        session.set_search(query);
        "filtered".to_string()
    })
}

/// Opens an empty editor.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_open_new_note() -> WidgetResponse {
    with_session(false, |session, _| {
        session.open_new_note();
        "editor_open".to_string()
    })
}

/// Opens the editor for an active note.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_open_edit(note_ref: u64) -> WidgetResponse {
    with_session(false, |session, prompt| {
        match session.open_edit(NoteRef::from(note_ref)) {
            Ok(()) => "editor_open".to_string(),
            Err(err) => {
                prompt.messages.push(err.to_string());
                "ignored".to_string()
            }
        }
    })
}

/// Closes the editor, discarding input.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_close_editor() -> WidgetResponse {
    with_session(false, |session, _| {
        session.close_editor();
        "editor_closed".to_string()
    })
}

/// Saves editor input. `title` is ignored while editing an existing note.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_save(title: String, content: String) -> WidgetResponse {
    with_session(false, |session, prompt| {
        if !session.editor().title_locked() {
            if let Err(err) = session.set_editor_title(title) {
                prompt.messages.push(err.to_string());
                return "ignored".to_string();
            }
        }
        if let Err(err) = session.set_editor_content(content) {
            prompt.messages.push(err.to_string());
            return "ignored".to_string();
        }
        outcome_label(session.save_editor(prompt))
    })
}

/// Moves an active note to trash. `confirmed` is the user's dialog answer.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_trash(note_ref: u64, confirmed: bool) -> WidgetResponse {
    with_session(confirmed, |session, prompt| {
        outcome_label(session.trash(NoteRef::from(note_ref), prompt))
    })
}

/// Moves a trashed note back to the notes list.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_restore(note_ref: u64) -> WidgetResponse {
    with_session(false, |session, _| {
        outcome_label(session.restore(NoteRef::from(note_ref)))
    })
}

/// Permanently deletes a trashed note. `confirmed` is the user's answer.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_delete_permanently(note_ref: u64, confirmed: bool) -> WidgetResponse {
    with_session(confirmed, |session, prompt| {
        outcome_label(session.delete_permanently(NoteRef::from(note_ref), prompt))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn widget_undo() -> WidgetResponse {
    with_session(false, |session, prompt| outcome_label(session.undo(prompt)))
}

#[flutter_rust_bridge::frb(sync)]
pub fn widget_redo() -> WidgetResponse {
    with_session(false, |session, prompt| outcome_label(session.redo(prompt)))
}

/// Dispatches a key chord such as `ctrl+z`.
///
/// Outcome is `handled` when the UI must suppress the platform default.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_key(chord: String) -> WidgetResponse {
    with_session(false, |session, prompt| {
        let handled =
            KeyChord::parse(&chord).is_some_and(|chord| session.handle_key(&chord, prompt));
        if handled {
            "handled".to_string()
        } else {
            "unhandled".to_string()
        }
    })
}

/// Saves immediately and acknowledges.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_sync() -> WidgetResponse {
    with_session(false, |session, prompt| match session.sync(prompt) {
        Outcome::Failed => "sync_failed".to_string(),
        outcome => outcome_label(outcome),
    })
}

/// Writes the debounced save if its window has elapsed.
///
/// Meant to be polled from a UI timer.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_flush_pending_save() -> WidgetResponse {
    with_session(false, |session, _| {
        if session.flush_pending_save(Instant::now()) {
            "saved".to_string()
        } else {
            "idle".to_string()
        }
    })
}

struct AnsweredPrompt {
    confirmed: bool,
    messages: Vec<String>,
}

impl Prompt for AnsweredPrompt {
    fn confirm(&mut self, _message: &str) -> bool {
        self.confirmed
    }

    fn acknowledge(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

fn with_session(
    confirmed: bool,
    f: impl FnOnce(&mut Session, &mut AnsweredPrompt) -> String,
) -> WidgetResponse {
    let session = match SESSION.get_or_init(open_session) {
        Ok(session) => session,
        Err(err) => return WidgetResponse::failure(format!("widget session unavailable: {err}")),
    };
    let mut guard = match session.lock() {
        Ok(guard) => guard,
        Err(_) => {
            error!("event=ffi_session module=ffi status=error error_code=lock_poisoned");
            return WidgetResponse::failure("widget session lock poisoned");
        }
    };

    let mut prompt = AnsweredPrompt {
        confirmed,
        messages: Vec::new(),
    };
    let outcome = f(&mut guard, &mut prompt);
    to_response(&guard, outcome, prompt.messages)
}

fn open_session() -> Result<Mutex<Session>, String> {
    let config = NotivaConfig::from_env().unwrap_or_else(|err| {
        warn!("event=ffi_session module=ffi status=degraded error_code=config_invalid error={err}");
        NotivaConfig::default()
    });
    let kv = SqliteKeyValueStore::open(&config.db_path).map_err(|err| {
        error!("event=ffi_session module=ffi status=error error_code=db_open_failed error={err}");
        err.to_string()
    })?;
    let mut session =
        InteractionController::with_persistence(PersistenceAdapter::with_debounce(
            kv,
            config.save_debounce,
        ));
    session.start();
    Ok(Mutex::new(session))
}

fn to_response(session: &Session, outcome: String, messages: Vec<String>) -> WidgetResponse {
    let editor = session.editor();
    WidgetResponse {
        ok: true,
        outcome,
        messages,
        view: session.view().label().to_string(),
        cards: session.cards().iter().map(to_widget_card).collect(),
        editor: WidgetEditor {
            open: editor.is_open(),
            title_locked: editor.title_locked(),
            title: editor.title().to_string(),
            content: editor.content().to_string(),
        },
    }
}

fn to_widget_card(card: &NoteCard) -> WidgetCard {
    WidgetCard {
        note_ref: card.note_ref.as_u64(),
        title: card.title.clone(),
        content: card.content.clone(),
        actions: card
            .actions
            .iter()
            .map(|action| action_id(*action).to_string())
            .collect(),
    }
}

fn action_id(action: CardAction) -> &'static str {
    match action {
        CardAction::Edit => "edit",
        CardAction::Delete => "delete",
        CardAction::Restore => "restore",
        CardAction::DeletePermanently => "delete_permanently",
    }
}

fn outcome_label(outcome: Outcome) -> String {
    match outcome {
        Outcome::Applied => "applied",
        Outcome::Declined => "declined",
        Outcome::Rejected => "rejected",
        Outcome::Ignored => "ignored",
        Outcome::Failed => "failed",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, widget_delete_permanently, widget_open_edit,
        widget_open_new_note, widget_redo, widget_render, widget_restore, widget_save,
        widget_search, widget_switch_view, widget_sync, widget_trash, widget_undo,
        WidgetResponse,
    };
    use notiva_core::config::ENV_DB_PATH;
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    // The widget session is process-wide; tests touching it run one at a time.
    static SESSION_TESTS: Mutex<()> = Mutex::new(());
    static SESSION_DIR: OnceLock<TempDir> = OnceLock::new();

    /// Serializes session tests and points the session at a scratch database
    /// before it is first opened.
    fn session_guard() -> MutexGuard<'static, ()> {
        let guard = SESSION_TESTS.lock().unwrap_or_else(|err| err.into_inner());
        session_db_path();
        guard
    }

    fn session_db_path() -> PathBuf {
        let dir = SESSION_DIR.get_or_init(|| {
            let dir = tempfile::tempdir().expect("temp dir");
            std::env::set_var(ENV_DB_PATH, dir.path().join("notiva-ffi.sqlite3"));
            dir
        });
        dir.path().join("notiva-ffi.sqlite3")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn create_edit_undo_redo_through_ffi() {
        let _guard = session_guard();
        let token = unique_token("ffi-edit");
        widget_switch_view("Notes List".to_string());
        widget_search(token.clone());

        widget_open_new_note();
        let created = widget_save(token.clone(), "v1".to_string());
        assert!(created.ok, "{:?}", created.messages);
        assert_eq!(created.outcome, "applied");
        let note_ref = only_card(&created);

        let opened = widget_open_edit(note_ref);
        assert!(opened.editor.title_locked);
        widget_save(String::new(), "v2".to_string());

        let undone = widget_undo();
        assert_eq!(undone.outcome, "applied");
        assert_eq!(undone.cards[0].content, "v1");
        let redone = widget_redo();
        assert_eq!(redone.cards[0].content, "v2");

        widget_search(String::new());
    }

    #[test]
    fn trash_restore_and_purge_through_ffi() {
        let _guard = session_guard();
        let token = unique_token("ffi-trash");
        widget_switch_view("Notes List".to_string());
        widget_search(token.clone());

        widget_open_new_note();
        let note_ref = only_card(&widget_save(token.clone(), "body".to_string()));

        let declined = widget_trash(note_ref, false);
        assert_eq!(declined.outcome, "declined");
        assert_eq!(declined.cards.len(), 1);

        let trashed = widget_trash(note_ref, true);
        assert_eq!(trashed.outcome, "applied");
        assert!(trashed.cards.is_empty());

        let trash_view = widget_switch_view("Trash".to_string());
        assert_eq!(trash_view.view, "Trash");
        let trashed_ref = only_card(&trash_view);
        assert_eq!(
            trash_view.cards[0].actions,
            vec!["restore", "delete_permanently"]
        );

        widget_restore(trashed_ref);
        let notes = widget_switch_view("Notes List".to_string());
        let restored_ref = only_card(&notes);

        widget_trash(restored_ref, true);
        let trash_view = widget_switch_view("Trash".to_string());
        let purged = widget_delete_permanently(only_card(&trash_view), true);
        assert_eq!(purged.outcome, "applied");
        assert!(purged.cards.is_empty());

        let synced = widget_sync();
        assert_eq!(synced.messages, vec!["Synced (saved to local storage)."]);

        widget_switch_view("Notes List".to_string());
        widget_search(String::new());
    }

    #[test]
    fn render_reports_current_view() {
        let _guard = session_guard();
        widget_switch_view("Notes List".to_string());
        let response = widget_render();
        assert!(response.ok);
        assert_eq!(response.view, "Notes List");
        assert_eq!(widget_switch_view("nowhere".to_string()).outcome, "unknown_view");
    }

    #[test]
    fn session_writes_to_configured_database() {
        let _guard = session_guard();
        let synced = widget_sync();
        assert!(synced.ok, "{:?}", synced.messages);
        assert_eq!(synced.outcome, "applied");
        assert!(session_db_path().exists());
    }

    fn only_card(response: &WidgetResponse) -> u64 {
        assert_eq!(response.cards.len(), 1, "{response:?}");
        response.cards[0].note_ref
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
