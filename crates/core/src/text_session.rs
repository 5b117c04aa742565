//! In-progress text draft
//!
//! Keystrokes only touch the draft. The store sees the text once, when the
//! draft is committed on blur or when focus moves to another item.

use doc_model::ItemId;

/// Text to write back into an item when its draft is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCommit {
    pub id: ItemId,
    pub text: String,
}

#[derive(Debug, Clone)]
struct Draft {
    id: ItemId,
    committed: String,
    text: String,

    /// Byte offset, always on a char boundary
    caret: usize,
}

/// Draft buffer for the single item in text-edit mode
#[derive(Debug, Clone, Default)]
pub struct TextEditSession {
    draft: Option<Draft>,
}

impl TextEditSession {
    /// Create a session with nothing being edited
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `id`, seeding the draft with `current_text`
    ///
    /// If another item was being edited its draft is flushed first and the
    /// resulting commit, if any, is returned. Re-entering the item already
    /// being edited keeps its draft.
    pub fn begin(&mut self, id: ItemId, current_text: &str) -> Option<TextCommit> {
        if self.editing() == Some(&id) {
            return None;
        }

        let flushed = self.blur();
        self.draft = Some(Draft {
            id,
            committed: current_text.to_owned(),
            text: current_text.to_owned(),
            caret: current_text.len(),
        });
        flushed
    }

    /// Item currently in text-edit mode
    pub fn editing(&self) -> Option<&ItemId> {
        self.draft.as_ref().map(|draft| &draft.id)
    }

    /// Current draft text
    pub fn draft(&self) -> Option<&str> {
        self.draft.as_ref().map(|draft| draft.text.as_str())
    }

    /// Caret position in chars from the start of the draft
    pub fn caret(&self) -> Option<usize> {
        self.draft
            .as_ref()
            .map(|draft| draft.text[..draft.caret].chars().count())
    }

    /// Check if the draft differs from the item's committed text
    pub fn is_dirty(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|draft| draft.text != draft.committed)
    }

    /// Replace the whole draft, caret at end
    pub fn set_draft(&mut self, text: &str) {
        if let Some(draft) = &mut self.draft {
            draft.text = text.to_owned();
            draft.caret = draft.text.len();
        }
    }

    /// Insert at the caret
    pub fn insert(&mut self, text: &str) {
        if let Some(draft) = &mut self.draft {
            draft.text.insert_str(draft.caret, text);
            draft.caret += text.len();
        }
    }

    /// Delete the char before the caret
    pub fn backspace(&mut self) {
        if let Some(draft) = &mut self.draft {
            if let Some((index, _)) = draft.text[..draft.caret].char_indices().next_back() {
                draft.text.replace_range(index..draft.caret, "");
                draft.caret = index;
            }
        }
    }

    /// Move the caret one char left
    pub fn caret_left(&mut self) {
        if let Some(draft) = &mut self.draft {
            if let Some((index, _)) = draft.text[..draft.caret].char_indices().next_back() {
                draft.caret = index;
            }
        }
    }

    /// Move the caret one char right
    pub fn caret_right(&mut self) {
        if let Some(draft) = &mut self.draft {
            if let Some(ch) = draft.text[draft.caret..].chars().next() {
                draft.caret += ch.len_utf8();
            }
        }
    }

    pub fn caret_to_start(&mut self) {
        if let Some(draft) = &mut self.draft {
            draft.caret = 0;
        }
    }

    pub fn caret_to_end(&mut self) {
        if let Some(draft) = &mut self.draft {
            draft.caret = draft.text.len();
        }
    }

    /// Leave text-edit mode
    ///
    /// Returns a commit only if the draft differs from the text the item had
    /// when editing began.
    pub fn blur(&mut self) -> Option<TextCommit> {
        let draft = self.draft.take()?;
        (draft.text != draft.committed).then_some(TextCommit {
            id: draft.id,
            text: draft.text,
        })
    }

    /// Drop the draft of `id` without committing; used when the item is deleted
    pub fn discard(&mut self, id: &ItemId) -> bool {
        if self.editing() == Some(id) {
            self.draft = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> ItemId {
        ItemId::new(raw)
    }

    #[test]
    fn test_draft_seeded_with_caret_at_end() {
        let mut session = TextEditSession::new();
        session.begin(id("a"), "héllo");

        assert_eq!(session.draft(), Some("héllo"));
        assert_eq!(session.caret(), Some(5));
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_unchanged_draft_commits_nothing() {
        let mut session = TextEditSession::new();
        session.begin(id("a"), "same");
        session.insert("!");
        session.backspace();

        assert_eq!(session.blur(), None);
        assert_eq!(session.editing(), None);
    }

    #[test]
    fn test_keystrokes_produce_one_commit_on_blur() {
        let mut session = TextEditSession::new();
        session.begin(id("a"), "");
        for ch in ["H", "e", "l", "l", "o"] {
            session.insert(ch);
        }

        assert_eq!(
            session.blur(),
            Some(TextCommit {
                id: id("a"),
                text: "Hello".to_owned()
            })
        );
        assert_eq!(session.blur(), None);
    }

    #[test]
    fn test_switching_items_flushes_previous_draft() {
        let mut session = TextEditSession::new();
        session.begin(id("a"), "");
        session.set_draft("foo");

        let flushed = session.begin(id("b"), "bar");

        assert_eq!(
            flushed,
            Some(TextCommit {
                id: id("a"),
                text: "foo".to_owned()
            })
        );
        assert_eq!(session.editing(), Some(&id("b")));
        assert_eq!(session.draft(), Some("bar"));
    }

    #[test]
    fn test_begin_same_item_keeps_draft() {
        let mut session = TextEditSession::new();
        session.begin(id("a"), "x");
        session.insert("y");

        assert_eq!(session.begin(id("a"), "x"), None);
        assert_eq!(session.draft(), Some("xy"));
    }

    #[test]
    fn test_caret_moves_by_char() {
        let mut session = TextEditSession::new();
        session.begin(id("a"), "aé");
        session.caret_left();
        session.insert("-");
        assert_eq!(session.draft(), Some("a-é"));

        session.caret_to_start();
        session.backspace();
        session.caret_right();
        session.insert("+");
        assert_eq!(session.draft(), Some("a+-é"));
        assert_eq!(session.caret(), Some(2));

        session.caret_to_end();
        session.backspace();
        assert_eq!(session.draft(), Some("a+-"));
    }

    #[test]
    fn test_discard_only_matches_edited_item() {
        let mut session = TextEditSession::new();
        session.begin(id("a"), "");
        session.set_draft("unsaved");

        assert!(!session.discard(&id("b")));
        assert!(session.discard(&id("a")));
        assert_eq!(session.blur(), None);
    }
}
