//! PostComposer - expands a topic into a full LinkedIn post.

use std::time::Duration;

use minijinja::{Environment, context};
use postpilot_core::deadline::run_with_deadline;
use postpilot_core::{CancellationToken, DraftPost, PostPilotError, Result, Topic};
use tracing::info;

use crate::gemini_client::{GeminiClient, GenerateContentRequest};

const POST_TEMPLATE_NAME: &str = "post_prompt";
const POST_TEMPLATE: &str = include_str!("../prompts/post_prompt.md");
const POST_GENERATION: &str = "Post Generation";

#[derive(Clone)]
pub struct PostComposer {
    gemini: GeminiClient,
    timeout: Duration,
}

impl PostComposer {
    pub fn new(gemini: GeminiClient, timeout: Duration) -> Self {
        Self { gemini, timeout }
    }

    /// Renders the instructional prompt with `topic` on its `TOPIC(PROMPT):` line.
    pub fn build_prompt(topic: &Topic) -> Result<String> {
        let mut env = Environment::new();
        env.add_template(POST_TEMPLATE_NAME, POST_TEMPLATE)
            .map_err(template_error)?;
        env.get_template(POST_TEMPLATE_NAME)
            .and_then(|template| template.render(context! { topic => topic.as_str() }))
            .map_err(template_error)
    }

    /// Generates the post body. The model answer is returned as-is.
    pub async fn compose_post(&self, topic: &Topic, cancel: &CancellationToken) -> Result<DraftPost> {
        let prompt = Self::build_prompt(topic)?;
        info!(model = self.gemini.model(), "composing post");

        let request = GenerateContentRequest::user_prompt(prompt);
        let text = run_with_deadline(
            POST_GENERATION,
            self.timeout,
            cancel,
            self.gemini.generate(&request),
        )
        .await?;

        Ok(DraftPost::new(text))
    }
}

fn template_error(err: minijinja::Error) -> PostPilotError {
    PostPilotError::Serialization {
        format: "template".to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_topic_once_on_topic_line() {
        let topic = Topic::new("Edge AI inference").unwrap();
        let prompt = PostComposer::build_prompt(&topic).unwrap();

        assert!(prompt.starts_with("TOPIC(PROMPT):Edge AI inference\n"));
        assert_eq!(prompt.matches("Edge AI inference").count(), 1);
        assert!(prompt.contains("Latin Pro"));
        assert!(prompt.contains("150–200 words"));
    }

    #[test]
    fn test_topic_is_not_interpreted_as_template() {
        let topic = Topic::new("{{ 1 + 1 }} ways to ship").unwrap();
        let prompt = PostComposer::build_prompt(&topic).unwrap();
        assert!(prompt.contains("TOPIC(PROMPT):{{ 1 + 1 }} ways to ship"));
    }
}
