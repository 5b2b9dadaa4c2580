//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate store, history, view and persistence into widget intents.
//! - Keep front-ends (CLI, FFI) decoupled from storage details.

pub mod controller;
pub mod debounce;
pub mod keymap;
pub mod persistence;
