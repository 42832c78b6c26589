use anyhow::{Result, anyhow};
use colored::Colorize;
use postpilot_core::WorkflowState;

use super::console::print_ideas;
use super::context::AppContext;

pub async fn run() -> Result<()> {
    let context = AppContext::load().await?;
    let workflow = context.workflow()?;
    let mut state = WorkflowState::new();

    println!(
        "{}",
        format!("💡 Generating ideas ({})...", context.config.ideas.mode).bright_blue()
    );
    let ideas = workflow
        .generate_ideas(&mut state)
        .await
        .map_err(|envelope| anyhow!(envelope.error))?;

    print_ideas(&ideas);
    Ok(())
}
