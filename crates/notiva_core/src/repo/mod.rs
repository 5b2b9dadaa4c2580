//! Storage layer: in-memory note partitions and the local key-value store.
//!
//! # Responsibility
//! - Own note ordering and placement handles.
//! - Isolate SQLite details behind the `KeyValueStore` contract.

pub mod kv_store;
pub mod note_store;
