//! Note domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the widget core.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Every placement of a note in a partition is addressed by a `NoteRef`.

pub mod note;
pub mod snapshot;
