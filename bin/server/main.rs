//! Weekly Challenge Server
//!
//! Runs the submission board as a standalone HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use weekly_challenge::{run_server, ChallengeConfig};

#[derive(Parser, Debug)]
#[command(name = "challenge-server")]
#[command(about = "Weekly AI Challenge submission board")]
struct Args {
    /// Round configuration file
    #[arg(
        short,
        long,
        default_value = "challenge.toml",
        env = "CHALLENGE_CONFIG"
    )]
    config: PathBuf,

    /// Server port (overrides the config file)
    #[arg(short, long, env = "CHALLENGE_PORT")]
    port: Option<u16>,

    /// Server host (overrides the config file)
    #[arg(long, env = "CHALLENGE_HOST")]
    host: Option<String>,

    /// Storage path (overrides the config file)
    #[arg(short, long, env = "CHALLENGE_STORAGE_PATH")]
    storage: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("weekly_challenge=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = ChallengeConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(path) = args.storage {
        config.storage.path = path;
    }

    info!("Starting Weekly Challenge Server");
    info!("  Config: {}", args.config.display());
    info!("  Storage: {:?} at {}", config.storage.backend, config.storage.path.display());

    run_server(config).await
}
