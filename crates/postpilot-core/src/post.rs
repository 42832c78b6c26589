//! Generated post drafts.

use serde::{Deserialize, Serialize};

/// Prefix that marks a draft slot holding an error report instead of a post.
pub const ERROR_MARKER: &str = "Error";

/// Generated post body, superseded wholesale on every regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPost {
    text: String,
}

impl DraftPost {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// A draft is publishable when it has content and is not an error report.
    pub fn is_valid(&self) -> bool {
        let trimmed = self.text.trim();
        !trimmed.is_empty() && !trimmed.starts_with(ERROR_MARKER)
    }

    /// Replaces the body, e.g. after the user edited the draft.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}
