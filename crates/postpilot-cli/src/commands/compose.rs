use anyhow::{Result, anyhow};
use colored::Colorize;
use postpilot_core::WorkflowState;

use super::console::print_draft;
use super::context::AppContext;

pub async fn run(topic: &str) -> Result<()> {
    let context = AppContext::load().await?;
    let workflow = context.workflow()?;
    let mut state = WorkflowState::new();

    workflow
        .set_custom_topic(&mut state, topic)
        .map_err(|envelope| anyhow!(envelope.error))?;

    println!("{}", "✍️  Generating post...".bright_blue());
    let draft = workflow
        .generate_post(&mut state)
        .await
        .map_err(|envelope| anyhow!(envelope.error))?;

    print_draft(&draft);
    Ok(())
}
