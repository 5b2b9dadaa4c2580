//! Search over the visible partition.
//!
//! # Responsibility
//! - Decide whether a note matches the current search input.
//! - Keep matching pure so every keystroke can re-filter the in-memory list.

pub mod filter;
