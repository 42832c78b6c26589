//! Session state threaded through the idea → draft → image → publish steps.

use uuid::Uuid;

use crate::error::{PostPilotError, Result};
use crate::idea::Idea;
use crate::image::GeneratedImage;
use crate::post::DraftPost;
use crate::publish::PublishResult;
use crate::topic::Topic;

/// Everything one user session has produced so far.
///
/// Each step replaces its slot wholesale; nothing is merged. The state is
/// owned by a single caller and passed by `&mut` to each step.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    id: Uuid,
    ideas: Vec<Idea>,
    selected_idea: Option<usize>,
    topic: Option<Topic>,
    draft: Option<DraftPost>,
    image: Option<GeneratedImage>,
    last_publish: Option<PublishResult>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            ideas: Vec::new(),
            selected_idea: None,
            topic: None,
            draft: None,
            image: None,
            last_publish: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn selected_idea(&self) -> Option<&Idea> {
        self.selected_idea.and_then(|index| self.ideas.get(index))
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn draft(&self) -> Option<&DraftPost> {
        self.draft.as_ref()
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        self.image.as_ref()
    }

    pub fn last_publish(&self) -> Option<&PublishResult> {
        self.last_publish.as_ref()
    }

    /// Replaces the idea list; any previous selection is dropped.
    pub fn set_ideas(&mut self, ideas: Vec<Idea>) {
        self.ideas = ideas;
        self.selected_idea = None;
    }

    /// Selects an idea by zero-based index and adopts it as the topic.
    pub fn select_idea(&mut self, index: usize) -> Result<Topic> {
        let idea = self.ideas.get(index).ok_or_else(|| {
            PostPilotError::invalid_input(format!(
                "idea #{} does not exist ({} available)",
                index + 1,
                self.ideas.len()
            ))
        })?;
        let topic = Topic::from_idea(idea)?;
        self.selected_idea = Some(index);
        self.change_topic(topic.clone());
        Ok(topic)
    }

    /// Uses typed text as the topic instead of a generated idea.
    pub fn set_custom_topic(&mut self, text: &str) -> Result<Topic> {
        let topic = Topic::new(text)?;
        self.selected_idea = None;
        self.change_topic(topic.clone());
        Ok(topic)
    }

    fn change_topic(&mut self, topic: Topic) {
        if self.topic.as_ref() != Some(&topic) {
            self.draft = None;
            self.image = None;
            self.last_publish = None;
        }
        self.topic = Some(topic);
    }

    /// Drops the draft and image ahead of a regeneration.
    pub fn begin_regeneration(&mut self) {
        self.draft = None;
        self.image = None;
        self.last_publish = None;
    }

    pub fn set_draft(&mut self, draft: DraftPost) {
        self.draft = Some(draft);
        self.last_publish = None;
    }

    pub fn set_image(&mut self, image: GeneratedImage) {
        self.image = Some(image);
    }

    /// Forgets the image, e.g. after the user accepted a text-only fallback.
    pub fn discard_image(&mut self) -> Option<GeneratedImage> {
        self.image.take()
    }

    pub fn mark_published(&mut self, result: PublishResult) {
        self.last_publish = Some(result);
    }

    pub fn is_published(&self) -> bool {
        self.last_publish.as_ref().is_some_and(|r| r.success)
    }

    /// Text ready to publish: a valid draft that was not published yet.
    pub fn publishable_text(&self) -> Result<&str> {
        if self.is_published() {
            return Err(PostPilotError::invalid_input(
                "This draft was already published. Generate a new post first.",
            ));
        }
        match &self.draft {
            Some(draft) if draft.is_valid() => Ok(draft.text().trim()),
            _ => Err(PostPilotError::invalid_input(
                "Please generate a valid post first.",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::PostHandle;

    fn ideas() -> Vec<Idea> {
        (1..=3)
            .map(|n| Idea {
                title: format!("Idea {n}"),
                description: "Two. Sentences.".into(),
                detailed_description: format!("Detailed description {n}."),
                hashtags: vec!["#AI".into()],
            })
            .collect()
    }

    fn png() -> GeneratedImage {
        GeneratedImage::from_payload(vec![1, 2, 3], "image/png").unwrap()
    }

    #[test]
    fn test_select_idea_sets_topic_from_detailed_description() {
        let mut state = WorkflowState::new();
        state.set_ideas(ideas());
        let topic = state.select_idea(1).unwrap();
        assert_eq!(topic.as_str(), "Detailed description 2.");
        assert_eq!(state.selected_idea().unwrap().title, "Idea 2");
    }

    #[test]
    fn test_select_out_of_range_idea_fails() {
        let mut state = WorkflowState::new();
        state.set_ideas(ideas());
        assert!(state.select_idea(3).is_err());
        assert!(state.topic().is_none());
    }

    #[test]
    fn test_changing_topic_invalidates_draft_and_image() {
        let mut state = WorkflowState::new();
        state.set_custom_topic("Edge AI inference").unwrap();
        state.set_draft(DraftPost::new("post"));
        state.set_image(png());

        state.set_custom_topic("Quantum networking").unwrap();
        assert!(state.draft().is_none());
        assert!(state.image().is_none());
    }

    #[test]
    fn test_same_topic_keeps_draft() {
        let mut state = WorkflowState::new();
        state.set_custom_topic("Edge AI inference").unwrap();
        state.set_draft(DraftPost::new("post"));
        state.set_custom_topic("  Edge AI inference ").unwrap();
        assert!(state.draft().is_some());
    }

    #[test]
    fn test_publishable_text_requires_valid_unpublished_draft() {
        let mut state = WorkflowState::new();
        assert!(state.publishable_text().is_err());

        state.set_draft(DraftPost::new("Error generating post: boom"));
        assert!(state.publishable_text().is_err());

        state.set_draft(DraftPost::new("  A real post \n"));
        assert_eq!(state.publishable_text().unwrap(), "A real post");

        state.mark_published(PublishResult::published(None, PostHandle::Unavailable));
        assert!(state.publishable_text().is_err());
    }

    #[test]
    fn test_discard_image() {
        let mut state = WorkflowState::new();
        state.set_image(png());
        assert!(state.discard_image().is_some());
        assert!(state.image().is_none());
    }
}
