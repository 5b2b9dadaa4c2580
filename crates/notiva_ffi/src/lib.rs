//! Flutter-facing bindings for the Notiva widget core.
//!
//! # Responsibility
//! - Host the FRB-exported API module.
//! - Keep Dart-visible types free of core internals.

pub mod api;
