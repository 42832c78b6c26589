//! ContentWorkflow - the idea → draft → image → publish use case.
//!
//! The workflow owns the component clients; the caller owns the
//! [`WorkflowState`] and passes it into every step. Generation steps return a
//! [`ComponentOutcome`] (failures flattened to `{error}`); publishing returns
//! the typed error so the caller can tell a cancelled publish from a failed
//! one.

use std::sync::Arc;
use std::time::Duration;

use postpilot_core::config::{AppConfig, SecretConfig};
use postpilot_core::deadline::run_until_cancelled;
use postpilot_core::http::HttpTransport;
use postpilot_core::{
    CancellationToken, ComponentOutcome, DraftPost, ErrorEnvelope, FallbackDecision,
    GeneratedImage, Idea, PostPilotError, PublishResult, Result, Topic, WorkflowState,
};
use postpilot_interaction::{
    GeminiClient, IdeaSource, ImageSynthesizer, LinkedInProxy, NewsApiClient, PostComposer,
    PublishCoordinator,
};
use tracing::{error, info, warn};

use crate::publish_support::{
    FallbackDecider, ProgressSink, STEP_CREATING_POST, STEP_TEXT_ONLY, STEP_UPLOADING_IMAGE,
};

/// Outcome of [`ContentWorkflow::generate_post_and_image`].
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub draft: DraftPost,
    pub image: Option<GeneratedImage>,
    /// Set when the post succeeded but the image did not.
    pub image_error: Option<ErrorEnvelope>,
}

#[derive(Clone, Default)]
pub struct ContentWorkflow {
    ideas: Option<IdeaSource>,
    composer: Option<PostComposer>,
    images: Option<ImageSynthesizer>,
    publisher: Option<PublishCoordinator>,
    cancel: CancellationToken,
}

impl ContentWorkflow {
    pub fn new(ideas: IdeaSource, composer: PostComposer) -> Self {
        Self::default().with_generation(ideas, composer)
    }

    pub fn with_generation(mut self, ideas: IdeaSource, composer: PostComposer) -> Self {
        self.ideas = Some(ideas);
        self.composer = Some(composer);
        self
    }

    pub fn with_images(mut self, images: ImageSynthesizer) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_publisher(mut self, publisher: PublishCoordinator) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// In-flight generation calls stop when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Wires every component from configuration.
    ///
    /// Every section is optional; a step whose credentials are missing fails
    /// with a `Config` error when it runs.
    pub fn from_config(
        transport: Arc<dyn HttpTransport>,
        config: &AppConfig,
        secrets: &SecretConfig,
    ) -> Result<Self> {
        let mut workflow = Self::default();

        if let Some(gemini) = secrets.gemini.as_ref() {
            let gemini =
                GeminiClient::from_settings(transport.clone(), &config.gemini, gemini.api_key.clone());
            let news = secrets.news.as_ref().map(|news| {
                NewsApiClient::new(transport.clone(), &config.news, news.api_key.clone())
            });
            workflow = workflow.with_generation(
                IdeaSource::new(gemini.clone(), news, config.ideas.clone()),
                PostComposer::new(gemini, Duration::from_secs(config.post.timeout_secs)),
            );
        }

        if let Some(worker) = secrets.image_worker.as_ref() {
            workflow = workflow.with_images(ImageSynthesizer::new(
                transport.clone(),
                worker,
                Duration::from_secs(config.image.timeout_secs),
            ));
        }
        if let Some(linkedin) = secrets.linkedin.as_ref() {
            let proxy = LinkedInProxy::new(transport, linkedin, &config.linkedin);
            workflow = workflow.with_publisher(PublishCoordinator::new(
                proxy,
                linkedin.author_urn.clone(),
            ));
        }
        Ok(workflow)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn idea_source(&self) -> Result<&IdeaSource> {
        self.ideas
            .as_ref()
            .ok_or_else(|| PostPilotError::config("gemini.api_key is not configured"))
    }

    fn composer(&self) -> Result<&PostComposer> {
        self.composer
            .as_ref()
            .ok_or_else(|| PostPilotError::config("gemini.api_key is not configured"))
    }

    fn images(&self) -> Result<&ImageSynthesizer> {
        self.images.as_ref().ok_or_else(|| {
            PostPilotError::config("image_worker.endpoint / image_worker.api_key are not configured")
        })
    }

    fn publisher(&self) -> Result<&PublishCoordinator> {
        self.publisher.as_ref().ok_or_else(|| {
            PostPilotError::config(
                "linkedin.proxy_url / linkedin.access_token / linkedin.author_urn are not configured",
            )
        })
    }

    fn current_topic(state: &WorkflowState) -> Result<Topic> {
        state.topic().cloned().ok_or_else(|| {
            PostPilotError::invalid_input("Please select an idea or enter a custom topic.")
        })
    }

    // ============================================================================
    // Generation steps
    // ============================================================================

    /// Fetches a fresh batch of ideas into `state`.
    pub async fn generate_ideas(&self, state: &mut WorkflowState) -> ComponentOutcome<Vec<Idea>> {
        let source = self.idea_source()?;
        info!(workflow = %state.id(), mode = %source.mode(), "generating ideas");
        let ideas = source
            .fetch_ideas(&self.cancel)
            .await
            .inspect_err(|err| warn!(error = %err, "idea generation failed"))?;
        state.set_ideas(ideas.clone());
        Ok(ideas)
    }

    /// Adopts the detailed description of idea `index` as the topic.
    pub fn select_idea(&self, state: &mut WorkflowState, index: usize) -> ComponentOutcome<Topic> {
        Ok(state.select_idea(index)?)
    }

    pub fn set_custom_topic(&self, state: &mut WorkflowState, text: &str) -> ComponentOutcome<Topic> {
        Ok(state.set_custom_topic(text)?)
    }

    /// Drafts a new post for the current topic. The previous draft and image
    /// are dropped first.
    pub async fn generate_post(&self, state: &mut WorkflowState) -> ComponentOutcome<DraftPost> {
        let topic = Self::current_topic(state)?;
        let composer = self.composer()?;
        state.begin_regeneration();

        info!(workflow = %state.id(), "generating post");
        let draft = composer
            .compose_post(&topic, &self.cancel)
            .await
            .inspect_err(|err| warn!(error = %err, "post generation failed"))?;
        state.set_draft(draft.clone());
        Ok(draft)
    }

    /// Illustrates the current topic. A failure leaves the draft untouched.
    pub async fn generate_image(
        &self,
        state: &mut WorkflowState,
    ) -> ComponentOutcome<GeneratedImage> {
        let topic = Self::current_topic(state)?;
        let images = self.images()?;

        info!(workflow = %state.id(), "generating image");
        let image = images
            .synthesize_image(&topic, &self.cancel)
            .await
            .inspect_err(|err| warn!(error = %err, "image generation failed"))?;
        state.set_image(image.clone());
        Ok(image)
    }

    /// Drafts the post, then the image. Only the post is required to succeed.
    pub async fn generate_post_and_image(
        &self,
        state: &mut WorkflowState,
    ) -> ComponentOutcome<GenerationReport> {
        let draft = self.generate_post(state).await?;
        let (image, image_error) = match self.generate_image(state).await {
            Ok(image) => (Some(image), None),
            Err(err) => (None, Some(err)),
        };
        Ok(GenerationReport {
            draft,
            image,
            image_error,
        })
    }

    // ============================================================================
    // Publishing
    // ============================================================================

    /// Publishes the current draft, with the image when there is one.
    ///
    /// If the image upload fails, `decider` chooses between aborting
    /// ([`PostPilotError::PublishCancelled`]) and publishing text-only.
    /// Cancelling the workflow token stops the in-flight call with
    /// [`PostPilotError::Cancelled`].
    pub async fn publish(
        &self,
        state: &mut WorkflowState,
        decider: &dyn FallbackDecider,
        progress: &dyn ProgressSink,
    ) -> Result<PublishResult> {
        let publisher = self.publisher()?;
        let text = state.publishable_text()?.to_string();

        let asset_urn = match state.image() {
            Some(image) => {
                progress.report(STEP_UPLOADING_IMAGE);
                let upload = run_until_cancelled(
                    "Image Upload",
                    &self.cancel,
                    publisher.upload_image(image.payload()),
                )
                .await;
                match upload {
                    Ok(asset_urn) => {
                        progress.report(STEP_CREATING_POST);
                        Some(asset_urn)
                    }
                    // cancelled
                    Err(err) if !err.is_upload_failure() => return Err(err),
                    Err(err) => match decider.decide(&err).await {
                        FallbackDecision::ContinueTextOnly => {
                            info!(workflow = %state.id(), "continuing without the image");
                            state.discard_image();
                            progress.report(STEP_TEXT_ONLY);
                            None
                        }
                        FallbackDecision::Abort => {
                            error!(workflow = %state.id(), error = %err, "publish aborted after upload failure");
                            return Err(PostPilotError::PublishCancelled);
                        }
                    },
                }
            }
            None => {
                progress.report(STEP_TEXT_ONLY);
                None
            }
        };

        let result = run_until_cancelled(
            "Publishing",
            &self.cancel,
            publisher.create_post(&text, asset_urn),
        )
        .await
        .inspect_err(|err| error!(error = %err, "publishing failed"))?;
        state.mark_published(result.clone());
        Ok(result)
    }
}
