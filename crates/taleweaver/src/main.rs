mod commands;

use std::net::IpAddr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Types
// ============================================================================

/// Taleweaver - play and author branching stories served by a remote content API
#[derive(Parser, Debug)]
#[command(version = taleweaver::build_info::VERSION, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "taleweaver.yaml")]
        config: String,

        /// Host to bind to (overrides config file)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print reachability and broken-link diagnostics for a story
    Graph {
        /// Story to analyze
        #[arg(value_name = "STORY_ID")]
        story_id: String,

        /// Path to configuration file
        #[arg(short, long, default_value = "taleweaver.yaml")]
        config: String,

        /// Print only the summary counts
        #[arg(long)]
        summary: bool,
    },

    /// Print play statistics from the local database
    Stats {
        /// Path to configuration file
        #[arg(short, long, default_value = "taleweaver.yaml")]
        config: String,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => commands::serve::run(&config, host, port).await,
        Commands::Graph {
            story_id,
            config,
            summary,
        } => commands::graph::run(&config, &story_id, summary).await,
        Commands::Stats { config } => commands::stats::run(&config).await,
    }
}

// ============================================================================
// Initialization
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
