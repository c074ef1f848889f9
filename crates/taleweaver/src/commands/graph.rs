//! Print graph diagnostics for one story.

use anyhow::{Context, Result, bail};

use taleweaver::config::Config;
use taleweaver::content::ContentSource;
use taleweaver::story::diagnose;

pub async fn run(config_path: &str, story_id: &str, summary_only: bool) -> Result<()> {
    let config = Config::load(config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;
    let client = super::content_client(&config)?;

    let Some(story) = client
        .story_with_pages(story_id)
        .await
        .context("Failed to fetch story")?
    else {
        bail!("Story '{story_id}' not found");
    };

    let diagnostics = diagnose(&story);
    let json = if summary_only {
        serde_json::to_string_pretty(&diagnostics.summary)?
    } else {
        serde_json::to_string_pretty(&diagnostics)?
    };
    println!("{json}");
    Ok(())
}
