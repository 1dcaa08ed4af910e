//! Weekly AI Challenge CLI
//!
//! Local front end for a round: inspect it, validate or submit prediction
//! files, and view or export the leaderboard.

mod commands;
mod style;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use style::*;
use weekly_challenge::{ChallengeConfig, Competition};

#[derive(Parser)]
#[command(name = "challenge")]
#[command(about = "Weekly AI Challenge - submit predictions and follow the leaderboard")]
#[command(version)]
struct Cli {
    /// Round configuration file
    #[arg(
        short,
        long,
        global = true,
        default_value = "challenge.toml",
        env = "CHALLENGE_CONFIG"
    )]
    config: PathBuf,

    /// Override the configured storage path
    #[arg(long, global = true, env = "CHALLENGE_STORAGE_PATH")]
    storage: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the round: metric, required rows and dataset links
    Info,

    /// Write an example submission file
    Example {
        /// Output path
        #[arg(short, long, default_value = "example_submission.csv")]
        out: PathBuf,
    },

    /// Check a prediction file without submitting it
    Validate {
        /// CSV file with columns index,target
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Validate, score and store a prediction file
    Submit {
        /// Your name as it will appear on the leaderboard
        #[arg(short, long)]
        name: String,

        /// CSV file with columns index,target
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show the leaderboard
    #[command(visible_alias = "lb")]
    Leaderboard {
        /// Only show the first N participants
        #[arg(long)]
        top: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Download every stored submission as a zip archive
    Export {
        /// Output path
        #[arg(short, long, default_value = weekly_challenge::export::ARCHIVE_FILE_NAME)]
        out: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Info => open(&cli.config, cli.storage).and_then(|c| commands::info::run(&c)),
        Commands::Example { out } => {
            open(&cli.config, cli.storage).and_then(|c| commands::example::run(&c, &out))
        }
        Commands::Validate { file } => {
            open(&cli.config, cli.storage).and_then(|c| commands::validate::run(&c, &file))
        }
        Commands::Submit { name, file } => {
            open(&cli.config, cli.storage).and_then(|c| commands::submit::run(&c, &name, &file))
        }
        Commands::Leaderboard { top, json } => open(&cli.config, cli.storage)
            .and_then(|c| commands::leaderboard::run(&c, top, json)),
        Commands::Export { out } => {
            open(&cli.config, cli.storage).and_then(|c| commands::export::run(&c, &out))
        }
    };

    if let Err(e) = result {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn open(config_path: &Path, storage: Option<PathBuf>) -> Result<Competition> {
    let mut config = ChallengeConfig::load(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    if let Some(path) = storage {
        config.storage.path = path;
    }
    Competition::open(&config)
}

pub fn print_banner() {
    println!(
        r#"
  {}██╗    ██╗███████╗███████╗██╗  ██╗██╗  ██╗   ██╗{}
  {}██║    ██║██╔════╝██╔════╝██║ ██╔╝██║  ╚██╗ ██╔╝{}
  {}██║ █╗ ██║█████╗  █████╗  █████╔╝ ██║   ╚████╔╝ {}
  {}██║███╗██║██╔══╝  ██╔══╝  ██╔═██╗ ██║    ╚██╔╝  {}
  {}╚███╔███╔╝███████╗███████╗██║  ██╗███████╗██║   {}
  {} ╚══╝╚══╝ ╚══════╝╚══════╝╚═╝  ╚═╝╚══════╝╚═╝   {}
  {}AI Challenge{}
"#,
        CYAN, RESET, CYAN, RESET, CYAN, RESET, CYAN, RESET, CYAN, RESET, CYAN, RESET, DIM, RESET
    );
}
