//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result};

use taleweaver::config::{self, Config};
use taleweaver::content::HttpContentClient;
use taleweaver::store::SqliteStore;

pub mod graph;
pub mod serve;
pub mod stats;

/// Open the SQLite database named by the config, relative to the config file.
pub fn open_store(config_path: &str, config: &Config) -> Result<SqliteStore> {
    let db_path = config::resolve_path(Path::new(config_path), &config.storage.path);
    SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))
}

/// Build the remote content client from config.
pub fn content_client(config: &Config) -> Result<HttpContentClient> {
    HttpContentClient::new(&config.content).context("Failed to configure content client")
}
