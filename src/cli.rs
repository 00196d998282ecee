//! Command-line interface for gato.

use clap::{Parser, Subcommand};
use gato::Difficulty;
use std::path::PathBuf;

/// Gato - best-of-N tic-tac-toe against the CPU
#[derive(Parser, Debug)]
#[command(name = "gato")]
#[command(about = "Best-of-N tic-tac-toe series against a CPU opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = gato::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP move service
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Hard-tier answers served before falling back to medium
        #[arg(long)]
        hard_budget: Option<u32>,
    },

    /// Play a series in the terminal
    Play {
        /// Move service base URL (e.g. http://127.0.0.1:3000/api). Plays locally if absent.
        #[arg(long)]
        server_url: Option<String>,

        /// Starting difficulty (easy, medium, hard)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Path to the persisted state file
        #[arg(long)]
        state: Option<PathBuf>,
    },
}
