use std::path::PathBuf;

use anyhow::{Result, anyhow};
use colored::Colorize;
use postpilot_core::WorkflowState;

use super::console::save_image;
use super::context::AppContext;

pub async fn run(topic: &str, out: Option<PathBuf>) -> Result<()> {
    let context = AppContext::load().await?;
    let workflow = context.workflow()?;
    let mut state = WorkflowState::new();

    workflow
        .set_custom_topic(&mut state, topic)
        .map_err(|envelope| anyhow!(envelope.error))?;

    println!("{}", "🎨 Generating image...".bright_blue());
    let image = workflow
        .generate_image(&mut state)
        .await
        .map_err(|envelope| anyhow!(envelope.error))?;

    let path = save_image(&image, out.as_deref(), &format!("postpilot-{}", state.id()))?;
    println!(
        "{}",
        format!("✅ Saved {} ({} bytes) to {}", image.mime_type(), image.payload().len(), path.display()).green()
    );
    Ok(())
}
