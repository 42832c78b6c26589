//! Post ideas produced by the idea source.

use serde::{Deserialize, Serialize};

use crate::error::{PostPilotError, Result};

/// Number of ideas every successful idea batch contains.
pub const IDEA_BATCH_SIZE: usize = 10;

/// A structured post suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    /// Short catchy headline.
    pub title: String,
    /// Two short sentences.
    pub description: String,
    /// A 3-4 sentence paragraph; becomes the topic when selected.
    pub detailed_description: String,
    /// Ordered hashtags, as returned by the model.
    pub hashtags: Vec<String>,
}

impl Idea {
    /// Checks that every field carries content.
    pub fn validate(&self) -> Result<()> {
        let missing = if self.title.trim().is_empty() {
            Some("title")
        } else if self.description.trim().is_empty() {
            Some("description")
        } else if self.detailed_description.trim().is_empty() {
            Some("detailed_description")
        } else if self.hashtags.is_empty() || self.hashtags.iter().any(|h| h.trim().is_empty()) {
            Some("hashtags")
        } else {
            None
        };

        match missing {
            Some(field) => Err(PostPilotError::malformed(format!(
                "idea '{}' has an empty '{}' field",
                self.title, field
            ))),
            None => Ok(()),
        }
    }
}

/// Accepts a batch only if it holds exactly [`IDEA_BATCH_SIZE`] valid ideas.
///
/// The batch is returned untouched on success.
pub fn validate_idea_batch(ideas: Vec<Idea>) -> Result<Vec<Idea>> {
    if ideas.len() != IDEA_BATCH_SIZE {
        return Err(PostPilotError::malformed(format!(
            "expected exactly {} ideas, got {}",
            IDEA_BATCH_SIZE,
            ideas.len()
        )));
    }
    for idea in &ideas {
        idea.validate()?;
    }
    Ok(ideas)
}
