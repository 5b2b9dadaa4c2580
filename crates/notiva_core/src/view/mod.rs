//! View projection for the widget.
//!
//! # Responsibility
//! - Turn store contents into display cards and markup.
//! - Stay free of store/history mutation.

pub mod render;
