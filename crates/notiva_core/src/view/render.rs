//! Card projection and HTML markup for the visible partition.
//!
//! # Responsibility
//! - Project one partition (filtered by search) into display cards.
//! - Attach partition-appropriate actions to every card.
//! - Escape user text before it reaches markup.
//!
//! # Invariants
//! - Card order equals partition order.
//! - Card text fields are always HTML-escaped.

use crate::model::note::{NoteRef, Partition};
use crate::repo::note_store::NoteStore;
use crate::search::filter::SearchQuery;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static HTML_SPECIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[&<>"']"#).expect("valid html special regex"));

/// Action button shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    /// Opens the editor with the title locked.
    Edit,
    /// Moves the note to trash after confirmation.
    Delete,
    /// Moves the note back to the active list.
    Restore,
    /// Removes the note for good after confirmation.
    DeletePermanently,
}

impl CardAction {
    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Edit => "✏️ Edit",
            Self::Delete => "🗑️ Delete",
            Self::Restore => "♻️ Restore",
            Self::DeletePermanently => "❌ Delete Permanently",
        }
    }

    /// CSS class used by the markup.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Edit => "edit-btn",
            Self::Delete | Self::DeletePermanently => "delete-btn",
            Self::Restore => "restore-btn",
        }
    }

    /// Actions offered for notes in `partition`.
    pub fn for_partition(partition: Partition) -> &'static [CardAction] {
        match partition {
            Partition::Active => &[CardAction::Edit, CardAction::Delete],
            Partition::Trashed => &[CardAction::Restore, CardAction::DeletePermanently],
        }
    }
}

/// One rendered note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub note_ref: NoteRef,
    /// Escaped title.
    pub title: String,
    /// Escaped content.
    pub content: String,
    pub actions: &'static [CardAction],
}

/// Projects `partition` into cards, keeping only notes matching `query`.
pub fn render(store: &NoteStore, partition: Partition, query: &SearchQuery) -> Vec<NoteCard> {
    let actions = CardAction::for_partition(partition);
    store
        .list(partition)
        .iter()
        .filter(|entry| query.matches(&entry.note))
        .map(|entry| NoteCard {
            note_ref: entry.note_ref,
            title: escape_html(entry.note.title()),
            content: escape_html(&entry.note.content),
            actions,
        })
        .collect()
}

/// Renders cards as `note-card` markup.
pub fn render_html(cards: &[NoteCard]) -> String {
    let mut html = String::new();
    for card in cards {
        html.push_str(&format!(
            "<div class=\"note-card\" data-note-ref=\"{}\">\n  <h3>{}</h3>\n  <p>{}</p>\n  <div class=\"note-actions\">\n",
            card.note_ref.as_u64(),
            card.title,
            card.content
        ));
        for action in card.actions {
            html.push_str(&format!(
                "    <button class=\"{}\">{}</button>\n",
                action.css_class(),
                action.label()
            ));
        }
        html.push_str("  </div>\n</div>\n");
    }
    html
}

/// Escapes `& < > " '` for safe insertion into markup.
pub fn escape_html(raw: &str) -> String {
    HTML_SPECIAL_RE
        .replace_all(raw, |caps: &Captures<'_>| match &caps[0] {
            "&" => "&amp;",
            "<" => "&lt;",
            ">" => "&gt;",
            "\"" => "&quot;",
            _ => "&#039;",
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::{escape_html, render, render_html, CardAction};
    use crate::model::note::Partition;
    use crate::repo::note_store::NoteStore;
    use crate::search::filter::SearchQuery;

    #[test]
    fn escape_covers_minimum_set() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn render_filters_in_order_with_partition_actions() {
        let mut store = NoteStore::new();
        store.append(Partition::Active, "Groceries", "milk");
        store.append(Partition::Active, "Work", "standup");
        store.append(Partition::Active, "Errands", "buy MILK");
        store.append(Partition::Trashed, "Old", "milk tea");

        let cards = render(&store, Partition::Active, &SearchQuery::new("Milk"));
        let titles: Vec<_> = cards.iter().map(|card| card.title.as_str()).collect();
        assert_eq!(titles, vec!["Groceries", "Errands"]);
        assert_eq!(cards[0].actions, &[CardAction::Edit, CardAction::Delete]);

        let trash = render(&store, Partition::Trashed, &SearchQuery::default());
        assert_eq!(
            trash[0].actions,
            &[CardAction::Restore, CardAction::DeletePermanently]
        );
    }

    #[test]
    fn html_markup_never_contains_raw_user_markup() {
        let mut store = NoteStore::new();
        store.append(Partition::Active, "<script>", "a & b");

        let cards = render(&store, Partition::Active, &SearchQuery::default());
        let html = render_html(&cards);
        assert!(!html.contains("<script>"));
        assert!(html.contains("<h3>&lt;script&gt;</h3>"));
        assert!(html.contains("<p>a &amp; b</p>"));
        assert!(html.contains("class=\"edit-btn\""));
    }
}
