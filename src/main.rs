//! Gato - unified CLI
//!
//! Runs the move service or plays a series in the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use gato::{Difficulty, GameConfig, MoveService, TieredOpponent};
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = GameConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Command::Serve {
            host,
            port,
            hard_budget,
        } => run_server(config, host, port, hard_budget).await,
        Command::Play {
            server_url,
            difficulty,
            state,
        } => run_play(config, server_url, difficulty, state).await,
    }
}

/// Run the HTTP move service
#[instrument(skip(config))]
async fn run_server(
    config: GameConfig,
    host: Option<String>,
    port: Option<u16>,
    hard_budget: Option<u32>,
) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,gato=debug")),
        )
        .init();

    let host = host.unwrap_or_else(|| config.server().host().clone());
    let port = port.unwrap_or(*config.server().port());
    let hard_budget = hard_budget.or(*config.server().hard_budget());
    info!(%host, port, ?hard_budget, "Starting Gato move service");

    let service = MoveService::new(TieredOpponent::new(hard_budget));
    gato::serve(host, port, service).await
}

/// Run the TUI
async fn run_play(
    mut config: GameConfig,
    server_url: Option<String>,
    difficulty: Option<Difficulty>,
    state: Option<PathBuf>,
) -> Result<()> {
    if server_url.is_some() {
        config.set_api_base(server_url);
    }
    if let Some(difficulty) = difficulty {
        config.set_difficulty(difficulty);
    }
    if let Some(state) = state {
        config.set_storage_path(state);
    }
    gato::run_tui(config).await
}
