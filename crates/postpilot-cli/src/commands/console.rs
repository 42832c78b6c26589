//! Terminal rendering and the interactive seams (confirmations, progress).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use postpilot_application::publish_support::fallback_prompt;
use postpilot_application::{FallbackDecider, ProgressSink};
use postpilot_core::{DraftPost, FallbackDecision, GeneratedImage, Idea, PostPilotError, PublishResult};
use rustyline::DefaultEditor;

pub fn print_ideas(ideas: &[Idea]) {
    for (n, idea) in ideas.iter().enumerate() {
        println!("{} {}", format!("{:>2}.", n + 1).bright_black(), idea.title.bold());
        println!("    {}", idea.description);
        println!("    {}", idea.hashtags.join(" ").cyan());
    }
}

pub fn print_draft(draft: &DraftPost) {
    println!("{}", "─".repeat(60).bright_black());
    println!("{}", draft.text());
    println!("{}", "─".repeat(60).bright_black());
}

pub fn print_published(result: &PublishResult) {
    println!(
        "{}",
        format!("✅ Success! Post published. URN: {}", result.short_id()).green()
    );
}

pub fn print_error(context: &str, message: &str) {
    eprintln!("{}", format!("❌ {context}: {message}").red());
}

/// Writes the image to `out`, or to the temp directory named after `stem`.
pub fn save_image(image: &GeneratedImage, out: Option<&Path>, stem: &str) -> Result<PathBuf> {
    let path = match out {
        Some(path) => path.to_path_buf(),
        None => std::env::temp_dir().join(format!("{stem}.{}", image.file_extension())),
    };
    std::fs::write(&path, image.payload())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Prints publish steps as they happen.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&self, message: &str) {
        println!("{}", format!("⏳ {message}").cyan());
    }
}

/// Asks on the terminal whether to publish without the image.
pub struct ConsoleDecider;

#[async_trait::async_trait]
impl FallbackDecider for ConsoleDecider {
    async fn decide(&self, failure: &PostPilotError) -> FallbackDecision {
        let question = fallback_prompt(failure);
        let answer = tokio::task::spawn_blocking(move || confirm(&question)).await;
        match answer {
            Ok(Ok(true)) => FallbackDecision::ContinueTextOnly,
            _ => FallbackDecision::Abort,
        }
    }
}

/// Yes/no question; anything but y/yes is a no.
pub fn confirm(question: &str) -> Result<bool> {
    println!("{}", question.yellow());
    let mut rl = DefaultEditor::new()?;
    let line = rl.readline("[y/N] > ")?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
