//! Terminal UI for a series against the CPU.

mod app;
mod input;
mod ui;

use crate::config::GameConfig;
use crate::driver::SeriesDriver;
use crate::games::tictactoe::TieredOpponent;
use crate::remote::{LocalProvider, MoveProvider, RemoteProvider};
use crate::storage::{FileStorage, Storage};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

pub use app::App;

/// How often the loop wakes to expire notices.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the TUI until the user quits.
pub async fn run_tui(config: GameConfig) -> Result<()> {
    // Log to a file so output does not corrupt the screen
    let log_file = std::fs::File::create("gato_tui.log").context("creating gato_tui.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gato=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    info!(
        api_base = ?config.client().api_base(),
        storage = %config.storage().path().display(),
        "Starting Gato TUI"
    );

    let provider: Box<dyn MoveProvider> = match config.client().api_base() {
        Some(api_base) => Box::new(
            RemoteProvider::new(api_base, config.client().request_timeout())
                .context("building the move service client")?,
        ),
        None => Box::new(LocalProvider::new(TieredOpponent::new(
            *config.server().hard_budget(),
        ))),
    };
    let storage = FileStorage::new(config.storage().path());
    let driver = SeriesDriver::load(*config.series(), provider, storage)
        .with_request_timeout(config.client().request_timeout())
        .with_difficulty(*config.client().difficulty())
        .with_notice_ttl(config.notice_ttl());
    let mut app = App::new(driver);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }
    res
}

#[instrument(skip_all)]
async fn run_loop<P: MoveProvider, S: Storage>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<P, S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if app.pending_play(key.code).is_some() {
                app.set_thinking();
                terminal.draw(|f| ui::draw(f, app))?;
            }
            app.handle_key(key.code).await;
            if app.should_quit() {
                info!("User quit");
                return Ok(());
            }
        }

        app.tick(Instant::now());
    }
}
