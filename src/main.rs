//! Duelboard - text-mode board game shell
//!
//! Play against a human or the engine, or watch the engine play itself.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use duelboard::shell::{self, EventFormat};
use duelboard::{DepthSettings, ShellConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ShellConfig::from_file(path)?,
        None => {
            debug!("No config file given, using defaults");
            ShellConfig::default()
        }
    };

    match cli.command {
        Command::Play {
            human_side,
            opponent,
            depth,
        } => {
            let mut config = config;
            if let Some(side) = human_side {
                config = config.with_human_side(side.into());
            }
            if let Some(opponent) = opponent {
                config = config.with_opponent(opponent);
            }
            if let Some(depth) = depth {
                config = config.with_depths(DepthSettings::new(depth, depth));
            }
            info!(?config, "Starting interactive game");
            shell::play(config).await
        }
        Command::Watch {
            depth,
            max_plies,
            json,
        } => {
            let mut config = config;
            if let Some(depth) = depth {
                config = config.with_depths(DepthSettings::new(depth, depth));
            }
            if let Some(max_plies) = max_plies {
                config = config.with_max_plies(max_plies);
            }
            let format = if json {
                EventFormat::Json
            } else {
                EventFormat::Text
            };
            info!(?config, "Starting engine exhibition");
            shell::watch(config, format).await
        }
    }
}
