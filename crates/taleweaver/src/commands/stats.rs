//! Print play statistics from the local database.

use anyhow::{Context, Result};

use taleweaver::config::Config;
use taleweaver::story::stats::aggregate;
use taleweaver::store::OutcomeLog;

pub async fn run(config_path: &str) -> Result<()> {
    let config = Config::load(config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;
    let store = super::open_store(config_path, &config)?;

    let outcomes = store
        .list_all()
        .await
        .context("Failed to read play outcomes")?;
    let stats = aggregate(&outcomes);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
