//! The topic that drives post and image generation.

use serde::{Deserialize, Serialize};

use crate::error::{PostPilotError, Result};
use crate::idea::Idea;

/// Trimmed, non-empty subject of a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Creates a topic from user input, trimming surrounding whitespace.
    pub fn new(text: impl AsRef<str>) -> Result<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PostPilotError::invalid_input(
                "Please select an idea or enter a custom topic.",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The topic for a selected idea is its detailed description.
    pub fn from_idea(idea: &Idea) -> Result<Self> {
        Self::new(&idea.detailed_description)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = PostPilotError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_is_trimmed() {
        let topic = Topic::new("  Edge AI inference \n").unwrap();
        assert_eq!(topic.as_str(), "Edge AI inference");
    }

    #[test]
    fn test_blank_topic_is_rejected() {
        assert!(matches!(
            Topic::new(" \t "),
            Err(PostPilotError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_topic_from_idea_uses_detailed_description() {
        let idea = Idea {
            title: "Title".into(),
            description: "Short".into(),
            detailed_description: "The detailed paragraph.".into(),
            hashtags: vec!["#x".into()],
        };
        assert_eq!(
            Topic::from_idea(&idea).unwrap().as_str(),
            "The detailed paragraph."
        );
    }

    #[test]
    fn test_deserialize_rejects_blank() {
        assert!(serde_json::from_str::<Topic>("\"  \"").is_err());
    }
}
