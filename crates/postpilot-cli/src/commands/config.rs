use anyhow::{Context, Result};
use colored::Colorize;

use super::context::AppContext;

fn status(configured: bool) -> colored::ColoredString {
    if configured {
        "configured".green()
    } else {
        "missing".red()
    }
}

pub async fn show(init: bool) -> Result<()> {
    let context = AppContext::load().await?;
    let paths = &context.paths;

    if init {
        let path = paths
            .ensure_secret_file()
            .context("Failed to create secret.json")?;
        println!("{}", format!("📝 Secret template at {}", path.display()).green());
    }

    println!("{}", "=== PostPilot configuration ===".bright_magenta().bold());
    println!("Config dir:  {}", paths.config_dir().display());
    println!("config.toml: {}", paths.config_file().display());
    println!("secret.json: {}", paths.secret_file().display());
    println!();

    let secrets = &context.secrets;
    println!("{}", "Credentials".bold());
    println!("  gemini        {}", status(secrets.gemini.is_some()));
    println!("  news          {}", status(secrets.news.is_some()));
    println!("  image_worker  {}", status(secrets.image_worker.is_some()));
    println!("  linkedin      {}", status(secrets.linkedin.is_some()));
    println!();

    println!("{}", "Effective settings".bold());
    print!("{}", toml::to_string_pretty(&context.config)?);
    Ok(())
}
