//! Case-insensitive substring filter.
//!
//! # Invariants
//! - A blank query (after trimming) matches every note.
//! - Matching is a substring test over title OR content, ignoring case.
//! - Filtering never reorders notes.

use crate::model::note::Note;

/// Normalized search input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    /// Builds a query from raw search-box input.
    pub fn new(text: impl Into<String>) -> Self {
        let raw = text.into();
        let needle = raw.trim().to_lowercase();
        Self { raw, needle }
    }

    /// Input as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_blank(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, note: &Note) -> bool {
        if self.is_blank() {
            return true;
        }
        note.title().to_lowercase().contains(&self.needle)
            || note.content.to_lowercase().contains(&self.needle)
    }
}
