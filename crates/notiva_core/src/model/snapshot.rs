//! Persisted snapshot shape.
//!
//! # Invariants
//! - Both `notes` and `trash` must be present; any shape mismatch is a
//!   decode error and callers treat it as "no saved state".
//! - Entries keep partition order.
//! - Entries written without `id` get a fresh id on decode.

use crate::model::note::{Note, NoteId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One note as written to the key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedNote {
    pub title: String,
    pub content: String,
    #[serde(default = "Uuid::new_v4")]
    pub id: NoteId,
}

impl From<&Note> for PersistedNote {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title().to_string(),
            content: note.content.clone(),
            id: note.id,
        }
    }
}

impl From<PersistedNote> for Note {
    fn from(value: PersistedNote) -> Self {
        Note::with_id(value.id, value.title, value.content)
    }
}

/// Full ordered contents of both partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Active partition.
    pub notes: Vec<PersistedNote>,
    /// Trashed partition.
    pub trash: Vec<PersistedNote>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.trash.is_empty()
    }
}
