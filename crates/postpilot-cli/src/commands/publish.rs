use std::path::Path;

use anyhow::{Context, Result};
use postpilot_application::{FallbackDecider, FixedDecision};
use postpilot_core::{DraftPost, FallbackDecision, GeneratedImage, WorkflowState};

use super::console::{ConsoleDecider, ConsoleProgress, print_published};
use super::context::AppContext;

/// Loads an image file, guessing its mime type from the extension.
pub fn load_image(path: &Path) -> Result<GeneratedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    GeneratedImage::from_payload(bytes, mime.essence_str())
        .with_context(|| format!("{} is not an image", path.display()))
}

pub async fn run(text_file: &Path, image: Option<&Path>, yes: bool) -> Result<()> {
    let text = std::fs::read_to_string(text_file)
        .with_context(|| format!("Failed to read {}", text_file.display()))?;

    let mut state = WorkflowState::new();
    state.set_draft(DraftPost::new(text));
    if let Some(path) = image {
        state.set_image(load_image(path)?);
    }

    let context = AppContext::load().await?;
    let workflow = context.workflow()?;

    let decider: Box<dyn FallbackDecider> = if yes {
        Box::new(FixedDecision(FallbackDecision::ContinueTextOnly))
    } else {
        Box::new(ConsoleDecider)
    };
    let result = workflow
        .publish(&mut state, decider.as_ref(), &ConsoleProgress)
        .await?;

    print_published(&result);
    Ok(())
}
