//! Gato library - best-of-N tic-tac-toe against a CPU opponent
//!
//! # Architecture
//!
//! - **Games**: board model, win/draw rules and the CPU's move selectors
//! - **Series**: the controller that threads one serializable state
//!   through every round, score and reset
//! - **Remote**: where the CPU's replies come from (in-process or HTTP)
//! - **Driver**: applies player intents, awaits the CPU, persists state
//! - **Server**: the HTTP move service
//! - **TUI**: terminal front end
//!
//! # Example
//!
//! ```no_run
//! use gato::{LocalProvider, MemoryStorage, Position, SeriesConfig, SeriesDriver};
//!
//! # async fn example() {
//! let mut driver = SeriesDriver::load(
//!     SeriesConfig::default(),
//!     LocalProvider::default(),
//!     MemoryStorage::new(),
//! );
//! let transition = driver.play_cell(Position::Center).await;
//! # let _ = transition;
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod driver;
pub mod games;
mod protocol;
mod remote;
mod series;
mod server;
mod storage;
mod tui;

// Crate-level exports - Configuration
pub use config::{
    API_URL_ENV, ClientConfig, ConfigError, DEFAULT_CONFIG_FILE, GameConfig, ServerConfig,
    StorageConfig,
};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, Difficulty, Mark, Position, Square, TieredOpponent, check_winner, is_draw, is_full,
    select_move,
};

// Crate-level exports - Wire format
pub use protocol::{MOVE_HISTORY_ROUNDS, MoveRequest, MoveResponse};

// Crate-level exports - Series controller
pub use series::{
    HistoryEntry, Ignored, NOTICE_TTL, Notice, Phase, RoundOutcome, Scores, SeriesConfig,
    SeriesConfigError, SeriesOutcome, SeriesState, Session, Side, SnapshotError, Transition,
};

// Crate-level exports - Move providers
pub use remote::{LocalProvider, MoveProvider, ProviderError, RemoteProvider};

// Crate-level exports - Driver and storage
pub use driver::{REQUEST_TIMEOUT, SeriesDriver};
pub use storage::{
    FileStorage, MemoryStorage, SERIES_KEY, Storage, StorageError, THEME_KEY, Theme, load_theme,
};

// Crate-level exports - Front ends
pub use server::{MoveService, serve};
pub use tui::{App, run_tui};
