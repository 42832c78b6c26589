//! `postpilot run`: the interactive idea → post → image → publish session.

use anyhow::Result;
use colored::Colorize;
use postpilot_application::{ContentWorkflow, GenerationReport};
use postpilot_core::{PostPilotError, WorkflowState};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use super::console::{
    ConsoleDecider, ConsoleProgress, print_draft, print_error, print_ideas, print_published,
    save_image,
};
use super::context::{AppContext, cancel_on_ctrl_c};

/// What the user typed at the idea prompt.
#[derive(Debug, PartialEq, Eq)]
enum TopicChoice {
    Pick(usize),
    Custom(String),
    Refresh,
    Quit,
}

fn parse_topic_choice(line: &str, idea_count: usize) -> Option<TopicChoice> {
    let line = line.trim();
    match line {
        "" => None,
        "q" | "quit" | "exit" => Some(TopicChoice::Quit),
        "r" => Some(TopicChoice::Refresh),
        _ => match line.parse::<usize>() {
            Ok(n) if (1..=idea_count).contains(&n) => Some(TopicChoice::Pick(n - 1)),
            Ok(_) => None,
            Err(_) => Some(TopicChoice::Custom(line.to_string())),
        },
    }
}

/// What the user typed at the draft menu.
#[derive(Debug, PartialEq, Eq)]
enum DraftAction {
    Publish,
    RegeneratePost,
    RegenerateImage,
    NewTopic,
    Quit,
}

fn parse_draft_action(line: &str) -> Option<DraftAction> {
    match line.trim() {
        "p" => Some(DraftAction::Publish),
        "r" => Some(DraftAction::RegeneratePost),
        "i" => Some(DraftAction::RegenerateImage),
        "n" => Some(DraftAction::NewTopic),
        "q" | "quit" | "exit" => Some(DraftAction::Quit),
        _ => None,
    }
}

/// Reads one line. `None` means the session should end.
fn prompt(rl: &mut DefaultEditor, text: &str) -> Result<Option<String>> {
    loop {
        match rl.readline(text) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                return Ok(Some(line));
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'q' to quit.".yellow());
            }
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
}

/// Runs `step` against a copy of the workflow that Ctrl-C can interrupt
/// without affecting later steps.
macro_rules! interruptible {
    ($workflow:expr, |$w:ident| $step:expr) => {{
        let (cancel, watcher) = cancel_on_ctrl_c();
        let $w = $workflow.clone().with_cancellation(cancel);
        let outcome = $step;
        watcher.abort();
        outcome
    }};
}

fn show_report(report: &GenerationReport, state: &WorkflowState) {
    print_draft(&report.draft);
    match (&report.image, &report.image_error) {
        (Some(image), _) => match save_image(image, None, &format!("postpilot-{}", state.id())) {
            Ok(path) => println!("{}", format!("🖼  Image saved to {}", path.display()).green()),
            Err(err) => print_error("Image", &err.to_string()),
        },
        (None, Some(envelope)) => {
            print_error("Image", &envelope.error);
            println!("{}", "The post can still be published text-only.".bright_black());
        }
        (None, None) => {}
    }
}

pub async fn run() -> Result<()> {
    let context = AppContext::load().await?;
    let workflow: ContentWorkflow = context.build_workflow()?;
    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== PostPilot ===".bright_magenta().bold());
    println!(
        "{}",
        "Pick an idea by number, type your own topic, 'r' for new ideas, 'q' to quit.".bright_black()
    );

    'topic: loop {
        let mut state = WorkflowState::new();

        println!("{}", "💡 Generating ideas...".bright_blue());
        match interruptible!(workflow, |w| w.generate_ideas(&mut state).await) {
            Ok(ideas) => print_ideas(&ideas),
            Err(envelope) => {
                print_error("Ideas", &envelope.error);
                println!("{}", "Type a custom topic or 'r' to retry.".bright_black());
            }
        }

        // Topic selection
        loop {
            let Some(line) = prompt(&mut rl, "topic> ")? else {
                break 'topic;
            };
            let outcome = match parse_topic_choice(&line, state.ideas().len()) {
                None => continue,
                Some(TopicChoice::Quit) => break 'topic,
                Some(TopicChoice::Refresh) => continue 'topic,
                Some(TopicChoice::Pick(index)) => workflow.select_idea(&mut state, index),
                Some(TopicChoice::Custom(text)) => workflow.set_custom_topic(&mut state, &text),
            };
            match outcome {
                Ok(topic) => {
                    println!("{}", format!("Topic: {}", topic.as_str()).green());
                    break;
                }
                Err(envelope) => print_error("Topic", &envelope.error),
            }
        }

        println!("{}", "✍️  Generating post and image...".bright_blue());
        match interruptible!(workflow, |w| w.generate_post_and_image(&mut state).await) {
            Ok(report) => show_report(&report, &state),
            Err(envelope) => print_error("Post", &envelope.error),
        }

        // Draft menu
        loop {
            let Some(line) = prompt(
                &mut rl,
                "[p]ublish / [r]egenerate post / [i]mage again / [n]ew topic / [q]uit > ",
            )?
            else {
                break 'topic;
            };
            match parse_draft_action(&line) {
                None => continue,
                Some(DraftAction::Quit) => break 'topic,
                Some(DraftAction::NewTopic) => continue 'topic,
                Some(DraftAction::Publish) => {
                    match interruptible!(workflow, |w| {
                        w.publish(&mut state, &ConsoleDecider, &ConsoleProgress).await
                    }) {
                        Ok(result) => {
                            print_published(&result);
                            continue 'topic;
                        }
                        Err(PostPilotError::PublishCancelled) => {
                            println!("{}", "Publish cancelled. The draft is kept.".yellow());
                        }
                        Err(err) => print_error("Publish", &err.to_string()),
                    }
                }
                Some(DraftAction::RegeneratePost) => {
                    println!("{}", "✍️  Regenerating post and image...".bright_blue());
                    match interruptible!(workflow, |w| w.generate_post_and_image(&mut state).await) {
                        Ok(report) => show_report(&report, &state),
                        Err(envelope) => print_error("Post", &envelope.error),
                    }
                }
                Some(DraftAction::RegenerateImage) => {
                    println!("{}", "🎨 Regenerating image...".bright_blue());
                    match interruptible!(workflow, |w| w.generate_image(&mut state).await) {
                        Ok(image) => {
                            match save_image(&image, None, &format!("postpilot-{}", state.id())) {
                                Ok(path) => println!(
                                    "{}",
                                    format!("🖼  Image saved to {}", path.display()).green()
                                ),
                                Err(err) => print_error("Image", &err.to_string()),
                            }
                        }
                        Err(envelope) => print_error("Image", &envelope.error),
                    }
                }
            }
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
