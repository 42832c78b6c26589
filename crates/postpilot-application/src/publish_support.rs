//! Seams the publish use case talks to while it runs.

use postpilot_core::{FallbackDecision, PostPilotError};

/// Answers the question "the image upload failed, publish the text alone?".
///
/// Publishing never falls back silently: the decider is always consulted.
#[async_trait::async_trait]
pub trait FallbackDecider: Send + Sync {
    async fn decide(&self, failure: &PostPilotError) -> FallbackDecision;
}

/// A decider that always gives the same answer (`--yes` flags, scripts).
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub FallbackDecision);

#[async_trait::async_trait]
impl FallbackDecider for FixedDecision {
    async fn decide(&self, _failure: &PostPilotError) -> FallbackDecision {
        self.0
    }
}

/// Receives human-readable status lines while publishing.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Discards progress messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _message: &str) {}
}

pub const STEP_UPLOADING_IMAGE: &str = "Step 1/2: Registering and uploading image...";
pub const STEP_CREATING_POST: &str = "Step 2/2: Image uploaded. Creating final post...";
pub const STEP_TEXT_ONLY: &str = "Publishing text-only post...";

/// Question put to the user when the upload fails.
pub fn fallback_prompt(failure: &PostPilotError) -> String {
    format!(
        "Image upload failed ({failure}). Do you want to continue publishing the text post without the image?"
    )
}
