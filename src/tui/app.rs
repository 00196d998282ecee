//! Application state and key handling.

use super::input::{Action, action_for, move_cursor};
use crate::driver::SeriesDriver;
use crate::games::tictactoe::Position;
use crate::remote::MoveProvider;
use crate::series::{Phase, RoundOutcome, SeriesOutcome, Side, Transition};
use crate::storage::Storage;
use crossterm::event::KeyCode;
use std::time::Instant;
use tracing::debug;

/// Main application state.
pub struct App<P, S> {
    driver: SeriesDriver<P, S>,
    cursor: Position,
    status_message: String,
    quit: bool,
}

impl<P: MoveProvider, S: Storage> App<P, S> {
    /// Creates the application around a loaded driver.
    pub fn new(driver: SeriesDriver<P, S>) -> Self {
        let status_message = initial_status(&driver);
        Self {
            driver,
            cursor: Position::Center,
            status_message,
            quit: false,
        }
    }

    /// The series driver.
    pub fn driver(&self) -> &SeriesDriver<P, S> {
        &self.driver
    }

    /// Cell under the cursor.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Current status line.
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Whether the user asked to leave.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// The cell a key would play, if it plays one now.
    ///
    /// Lets the loop show a waiting message before the CPU is asked.
    pub fn pending_play(&self, key: KeyCode) -> Option<Position> {
        if self.driver.session().phase() != Phase::PlayerTurn {
            return None;
        }
        let pos = match action_for(key)? {
            Action::PlayCursor => self.cursor,
            Action::Play(pos) => pos,
            _ => return None,
        };
        self.driver
            .session()
            .state()
            .board()
            .is_empty(pos)
            .then_some(pos)
    }

    /// Marks the CPU as thinking.
    pub fn set_thinking(&mut self) {
        self.status_message = format!("CPU ({}) is thinking...", self.driver.provider_name());
    }

    /// Handles a key press.
    pub async fn handle_key(&mut self, key: KeyCode) {
        let Some(action) = action_for(key) else {
            return;
        };
        debug!(?action, "Handling key");

        let transition = match action {
            Action::Cursor(direction) => {
                self.cursor = move_cursor(self.cursor, direction);
                return;
            }
            Action::PlayCursor => self.driver.play_cell(self.cursor).await,
            Action::Play(pos) => {
                self.cursor = pos;
                self.driver.play_cell(pos).await
            }
            Action::NextRound => self.driver.advance_round(),
            Action::Reset => self.driver.reset(),
            Action::CycleDifficulty => {
                let next = self.driver.session().difficulty().next();
                self.driver.set_difficulty(next)
            }
            Action::ToggleTheme => {
                let theme = self.driver.toggle_theme();
                self.status_message = format!("Theme: {}", theme);
                return;
            }
            Action::Dismiss => self.driver.dismiss_notice(),
            Action::Quit => {
                self.quit = true;
                return;
            }
        };
        self.apply(transition);
    }

    /// Expires the notice when due.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.driver.tick(now)
    }

    fn apply(&mut self, transition: Transition) {
        self.status_message = match transition {
            Transition::Ignored(reason) => format!("Not now: {}.", reason),
            Transition::AwaitingOpponent(_) => "Waiting for the CPU...".to_string(),
            Transition::PlayerToMove => "Your move.".to_string(),
            Transition::RoundOver(outcome) => format!(
                "{} Press 'n' for the next round.",
                round_message(outcome)
            ),
            Transition::SeriesOver(outcome) => format!(
                "{} Press 'r' to play again.",
                series_message(outcome)
            ),
            Transition::RolledBack => {
                "The CPU could not be reached. Your move was undone; try again.".to_string()
            }
            Transition::RoundStarted(round) => format!("Round {}. Your move.", round),
            Transition::Reset => "New series. Your move.".to_string(),
            Transition::DifficultyChanged(difficulty) => {
                format!("Difficulty: {}.", difficulty)
            }
            Transition::NoticeDismissed => "Notice dismissed.".to_string(),
        };
    }
}

fn initial_status<P: MoveProvider, S: Storage>(driver: &SeriesDriver<P, S>) -> String {
    let session = driver.session();
    match session.phase() {
        Phase::SeriesOver => session
            .outcome()
            .map(series_message)
            .unwrap_or_default(),
        Phase::RoundOver => "Round over. Press 'n' for the next round.".to_string(),
        _ => format!("Round {}. Your move.", session.state().round()),
    }
}

/// Describes a finished round.
pub fn round_message(outcome: RoundOutcome) -> &'static str {
    match outcome {
        RoundOutcome::Player => "You win the round!",
        RoundOutcome::Opponent => "The CPU wins the round.",
        RoundOutcome::Draw => "The round is a draw.",
    }
}

/// Describes a finished series.
pub fn series_message(outcome: SeriesOutcome) -> String {
    match outcome {
        SeriesOutcome::Winner(Side::Player) => "You win the series!".to_string(),
        SeriesOutcome::Winner(Side::Opponent) => "The CPU wins the series.".to_string(),
        SeriesOutcome::Tied => "The series ends tied.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::TieredOpponent;
    use crate::remote::LocalProvider;
    use crate::series::SeriesConfig;
    use crate::storage::{MemoryStorage, Theme};

    fn app() -> App<LocalProvider, MemoryStorage> {
        let provider = LocalProvider::new(TieredOpponent::seeded(None, 7));
        App::new(SeriesDriver::load(
            SeriesConfig::default(),
            provider,
            MemoryStorage::new(),
        ))
    }

    #[tokio::test]
    async fn test_digit_plays_and_cpu_replies() {
        let mut app = app();
        assert_eq!(app.pending_play(KeyCode::Char('1')), Some(Position::TopLeft));

        app.handle_key(KeyCode::Char('1')).await;

        let board = app.driver().session().state().board().clone();
        assert_eq!(board.count(crate::games::tictactoe::Mark::X), 1);
        assert_eq!(board.count(crate::games::tictactoe::Mark::O), 1);
        assert_eq!(app.cursor(), Position::TopLeft);
        assert_eq!(app.status_message(), "Your move.");
        assert_eq!(app.pending_play(KeyCode::Char('1')), None);
    }

    #[tokio::test]
    async fn test_next_round_mid_round_is_ignored() {
        let mut app = app();
        app.handle_key(KeyCode::Char('n')).await;
        assert!(app.status_message().starts_with("Not now"));
    }

    #[tokio::test]
    async fn test_difficulty_and_dismiss_have_own_status() {
        let mut app = app();
        app.handle_key(KeyCode::Char('d')).await;
        assert_eq!(app.status_message(), "Difficulty: hard.");

        app.handle_key(KeyCode::Esc).await;
        assert_eq!(app.status_message(), "Notice dismissed.");
        assert!(app.driver().session().notice().is_none());
    }

    #[tokio::test]
    async fn test_theme_and_quit() {
        let mut app = app();
        app.handle_key(KeyCode::Char('t')).await;
        assert_eq!(app.driver().theme(), Theme::Dark);
        assert!(!app.should_quit());
        app.handle_key(KeyCode::Char('q')).await;
        assert!(app.should_quit());
    }
}
