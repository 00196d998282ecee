//! Strict validation of persisted series state.
//!
//! A stored snapshot is either entirely consistent with the active
//! [`SeriesConfig`] or rejected; callers fall back to a fresh series.

use super::state::{RoundOutcome, SeriesConfig, SeriesState, Side};
use crate::games::tictactoe::{Mark, check_winner, is_draw, is_full};
use derive_more::{Display, Error};
use tracing::{debug, instrument, warn};

/// A persisted snapshot failed validation.
#[derive(Debug, Clone, Display, Error)]
#[display("Snapshot rejected: {} at {}:{}", message, file, line)]
pub struct SnapshotError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SnapshotError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Malformed snapshot: {}", err))
    }
}

impl SeriesState {
    /// Parses and validates a stored snapshot.
    #[instrument(skip(raw, config), fields(len = raw.len()))]
    pub fn restore(raw: &str, config: &SeriesConfig) -> Result<Self, SnapshotError> {
        let state: SeriesState = serde_json::from_str(raw)?;
        state.validate(config)?;
        debug!(round = state.round, "Snapshot restored");
        Ok(state)
    }

    /// Parses a stored snapshot, falling back to a fresh series.
    #[instrument(skip(raw, config))]
    pub fn restore_or_default(raw: Option<&str>, config: &SeriesConfig) -> Self {
        match raw.map(|raw| Self::restore(raw, config)) {
            Some(Ok(state)) => state,
            Some(Err(e)) => {
                warn!(error = %e, "Discarding stored series");
                Self::new()
            }
            None => Self::new(),
        }
    }

    /// Checks every invariant a stable series state must satisfy.
    ///
    /// Stable means no request is in flight, so the player is always the
    /// side to move.
    #[track_caller]
    pub fn validate(&self, config: &SeriesConfig) -> Result<(), SnapshotError> {
        if self.round < 1 || self.round > *config.max_rounds() {
            return Err(SnapshotError::new(format!(
                "round {} outside 1..={}",
                self.round,
                config.max_rounds()
            )));
        }
        if self.turn != Side::Player {
            return Err(SnapshotError::new("saved while the CPU was to move"));
        }

        self.validate_scores(config)?;
        self.validate_board()?;
        self.validate_history()?;
        Ok(())
    }

    #[track_caller]
    fn validate_scores(&self, config: &SeriesConfig) -> Result<(), SnapshotError> {
        let threshold = *config.wins_to_take();
        let mut reached = None;
        for side in Side::ALL {
            let score = self.scores.get(side);
            if score > threshold {
                return Err(SnapshotError::new(format!(
                    "{} score {} above threshold {}",
                    side, score, threshold
                )));
            }
            if score == threshold {
                if reached.is_some() {
                    return Err(SnapshotError::new("both sides at the threshold"));
                }
                reached = Some(side);
            }
        }
        if reached != self.series_winner {
            return Err(SnapshotError::new(format!(
                "series winner {:?} disagrees with scores",
                self.series_winner
            )));
        }
        if self.series_winner.is_some() && self.round_result.is_none() {
            return Err(SnapshotError::new("series winner without a finished round"));
        }
        Ok(())
    }

    /// The round result must match what the board shows. Mark counts are
    /// not checked: a CPU board is adopted as returned, and a discarded one
    /// leaves the player's mark without a reply.
    #[track_caller]
    fn validate_board(&self) -> Result<(), SnapshotError> {
        let winner = check_winner(&self.board);
        let consistent = match self.round_result {
            None => winner.is_none() && !is_full(&self.board),
            Some(RoundOutcome::Player) => winner == Some(Mark::X),
            Some(RoundOutcome::Opponent) => winner == Some(Mark::O),
            Some(RoundOutcome::Draw) => is_draw(&self.board),
        };
        if !consistent {
            return Err(SnapshotError::new(format!(
                "board disagrees with round result {:?}",
                self.round_result
            )));
        }
        Ok(())
    }

    #[track_caller]
    fn validate_history(&self) -> Result<(), SnapshotError> {
        let completed = self.round - 1 + u32::from(self.round_result.is_some());
        if self.history.len() != completed as usize {
            return Err(SnapshotError::new(format!(
                "history has {} entries, expected {}",
                self.history.len(),
                completed
            )));
        }
        for (i, entry) in self.history.iter().enumerate() {
            if entry.round as usize != i + 1 {
                return Err(SnapshotError::new(format!(
                    "history entry {} is for round {}",
                    i, entry.round
                )));
            }
        }
        if let Some(result) = self.round_result
            && self.history.last().map(|e| e.result) != Some(result)
        {
            return Err(SnapshotError::new("last history entry disagrees with round result"));
        }
        for side in Side::ALL {
            let wins = self
                .history
                .iter()
                .filter(|e| e.result.winner() == Some(side))
                .count();
            if wins as u32 != self.scores.get(side) {
                return Err(SnapshotError::new(format!(
                    "history shows {} wins for {}, score says {}",
                    wins,
                    side,
                    self.scores.get(side)
                )));
            }
        }
        Ok(())
    }
}
