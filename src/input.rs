//! Text input state: the live draft and the value committed for encoding.

/// Key that commits the draft while the text field has focus.
pub const COMMIT_KEY: &str = "Enter";

/// Owns the draft text and the committed value that drives rendering.
///
/// The draft changes on every keystroke. The committed value changes only
/// when [`commit`](Self::commit) succeeds, and the QR region is shown
/// exactly when it is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputController {
    draft: String,
    committed: String,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current contents of the text field.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Returns the value last committed for encoding (empty if none).
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Copies the draft into the committed value.
    ///
    /// Empty and whitespace-only drafts are ignored. The draft is copied
    /// verbatim, surrounding whitespace included, and no validation of its
    /// shape (URL or otherwise) takes place.
    ///
    /// Returns true if the committed value was updated.
    pub fn commit(&mut self) -> bool {
        if self.draft.trim().is_empty() {
            log::debug!("ignoring commit of blank draft");
            return false;
        }
        self.committed.clone_from(&self.draft);
        true
    }

    /// Handles a key press in the text field. Only [`COMMIT_KEY`] acts.
    pub fn handle_key(&mut self, key: &str) -> bool {
        key == COMMIT_KEY && self.commit()
    }

    /// Returns true if the QR region should be displayed.
    pub fn is_qr_visible(&self) -> bool {
        !self.committed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_commit_is_ignored() {
        let mut input = InputController::new();
        assert!(!input.commit());

        input.set_draft("   \t\n");
        assert!(!input.commit());
        assert_eq!(input.committed(), "");
        assert!(!input.is_qr_visible());
    }

    #[test]
    fn blank_commit_keeps_previous_value() {
        let mut input = InputController::new();
        input.set_draft("first");
        assert!(input.commit());

        input.set_draft("  ");
        assert!(!input.commit());
        assert_eq!(input.committed(), "first");
        assert!(input.is_qr_visible());
    }

    #[test]
    fn commit_reveals_region() {
        let mut input = InputController::new();
        input.set_draft("Hello World");
        assert!(input.commit());
        assert_eq!(input.committed(), "Hello World");
        assert!(input.is_qr_visible());
    }

    #[test]
    fn commit_keeps_surrounding_whitespace() {
        let mut input = InputController::new();
        input.set_draft("  padded ");
        input.commit();
        assert_eq!(input.committed(), "  padded ");
    }

    #[test]
    fn only_enter_commits() {
        let mut input = InputController::new();
        input.set_draft("not a url");

        assert!(!input.handle_key("a"));
        assert!(!input.is_qr_visible());

        assert!(input.handle_key("Enter"));
        assert_eq!(input.committed(), "not a url");
    }

    #[test]
    fn editing_draft_does_not_touch_committed() {
        let mut input = InputController::new();
        input.set_draft("one");
        input.commit();
        input.set_draft("two");
        assert_eq!(input.draft(), "two");
        assert_eq!(input.committed(), "one");
    }
}
