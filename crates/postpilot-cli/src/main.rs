use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "postpilot")]
#[command(about = "PostPilot - find post ideas, draft, illustrate and publish them on LinkedIn", long_about = None)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch of 10 post ideas from recent news
    Ideas,
    /// Draft a post for a topic
    Compose {
        #[arg(short, long)]
        topic: String,
    },
    /// Generate an illustration for a topic
    Image {
        #[arg(short, long)]
        topic: String,
        /// Where to write the image (default: temp directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Publish a post from a text file, optionally with an image
    Publish {
        #[arg(long)]
        text_file: PathBuf,
        #[arg(long)]
        image: Option<PathBuf>,
        /// Publish text-only without asking if the image upload fails
        #[arg(short, long)]
        yes: bool,
    },
    /// Interactive idea → post → image → publish session
    Run,
    /// Show configuration paths and status
    Config {
        /// Write a secret.json template if none exists
        #[arg(long)]
        init: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "postpilot=debug"
    } else {
        "postpilot=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Ideas => commands::ideas::run().await?,
        Commands::Compose { topic } => commands::compose::run(&topic).await?,
        Commands::Image { topic, out } => commands::image::run(&topic, out).await?,
        Commands::Publish {
            text_file,
            image,
            yes,
        } => commands::publish::run(&text_file, image.as_deref(), yes).await?,
        Commands::Run => commands::wizard::run().await?,
        Commands::Config { init } => commands::config::show(init).await?,
    }

    Ok(())
}
