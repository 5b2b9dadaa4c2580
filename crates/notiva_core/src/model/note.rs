//! Note domain model.
//!
//! # Responsibility
//! - Define the note record shared by store, history, view and persistence.
//! - Separate stable identity (`NoteId`) from placement handles (`NoteRef`).
//!
//! # Invariants
//! - `id` is stable for a note's lifetime, across moves and reloads.
//! - `title` never changes after creation.
//! - A `NoteRef` names exactly one placement; moves allocate a new one.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Title assigned when a note is created with content only.
pub const UNTITLED_TITLE: &str = "Untitled";

/// Stable identifier for a note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Placement handle of a note inside one partition.
///
/// Allocated by the store on every append and never reused by the same
/// store. Handles from a previous placement stop resolving once a note is
/// moved or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteRef(u64);

impl NoteRef {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value, used by front-ends to round-trip card actions.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for NoteRef {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for NoteRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two note collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Notes visible in the main list.
    Active,
    /// Soft-deleted notes waiting for restore or permanent delete.
    Trashed,
}

impl Partition {
    /// Stable lowercase label for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trashed => "trashed",
        }
    }
}

/// Sidebar selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// "Notes List" menu item.
    Notes,
    /// "Trash" menu item.
    Trash,
    /// "Archive" menu item. Shown in the sidebar but not wired to a partition.
    Archive,
}

impl View {
    /// All sidebar items in display order.
    pub const ALL: [View; 3] = [View::Notes, View::Trash, View::Archive];

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Notes => "Notes List",
            Self::Trash => "Trash",
            Self::Archive => "Archive",
        }
    }

    /// Resolves a sidebar label (or a short alias) to a view.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "notes list" | "notes" => Some(Self::Notes),
            "trash" => Some(Self::Trash),
            "archive" => Some(Self::Archive),
            _ => None,
        }
    }

    /// Partition rendered by this view, if the view is wired.
    pub fn partition(self) -> Option<Partition> {
        match self {
            Self::Notes => Some(Partition::Active),
            Self::Trash => Some(Partition::Trashed),
            Self::Archive => None,
        }
    }
}

/// One note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable identity, preserved through moves and persistence.
    pub id: NoteId,
    title: String,
    /// Mutable body text.
    pub content: String,
}

impl Note {
    /// Creates a note with a generated stable id.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, content)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by move and load paths where identity already exists.
    pub fn with_id(id: NoteId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Validation error for editor input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Both title and content are blank after trimming.
    Empty,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Please enter a title or some content."),
        }
    }
}

impl Error for NoteValidationError {}

/// Trimmed editor input ready to become a note or an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    /// Trims both fields.
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
        }
    }

    /// Rejects drafts with neither title nor content.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.is_empty() && self.content.is_empty() {
            return Err(NoteValidationError::Empty);
        }
        Ok(())
    }

    /// Title to use for a new note.
    pub fn effective_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED_TITLE
        } else {
            &self.title
        }
    }
}
