//! Global keyboard shortcuts.
//!
//! # Invariants
//! - Ctrl or Meta plus `z` is undo; Ctrl or Meta plus `y` is redo.
//! - Keys are matched as reported by the platform, so `Z` (shift held) is
//!   not undo.

use once_cell::sync::Lazy;
use regex::Regex;

static CHORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^((?:[A-Za-z]+\+)*)(.)$").expect("valid chord regex"));

/// One key press with modifier state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    /// Plain key without modifiers.
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Key with Ctrl held.
    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    /// Key with Meta (Cmd) held.
    pub fn meta(key: impl Into<String>) -> Self {
        Self {
            meta: true,
            ..Self::plain(key)
        }
    }

    /// Parses chords such as `ctrl+z`, `Cmd+y` or `shift+ctrl+Z`.
    ///
    /// Returns `None` for unknown modifiers or multi-character keys.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = CHORD_RE.captures(text.trim())?;
        let mut chord = Self::plain(&caps[2]);
        for modifier in caps[1].split('+').filter(|part| !part.is_empty()) {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => chord.ctrl = true,
                "cmd" | "meta" | "super" => chord.meta = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                _ => return None,
            }
        }
        Some(chord)
    }
}

/// Widget-level shortcut bound to a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

/// Resolves the shortcut bound to `chord`, if any.
pub fn shortcut_for(chord: &KeyChord) -> Option<Shortcut> {
    if !(chord.ctrl || chord.meta) {
        return None;
    }
    match chord.key.as_str() {
        "z" => Some(Shortcut::Undo),
        "y" => Some(Shortcut::Redo),
        _ => None,
    }
}
