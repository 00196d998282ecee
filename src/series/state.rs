//! Series state: the serializable value the controller threads through
//! every transition.

use crate::games::tictactoe::{Board, Mark, Position, Square, check_winner, is_full};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// One side of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The human player (`X`).
    #[display("player")]
    Player,
    /// The CPU opponent (`O`).
    #[serde(rename = "cpu")]
    #[display("cpu")]
    Opponent,
}

impl Side {
    /// Both sides.
    pub const ALL: [Side; 2] = [Side::Player, Side::Opponent];

    /// The mark this side plays.
    pub fn mark(self) -> Mark {
        match self {
            Side::Player => Mark::X,
            Side::Opponent => Mark::O,
        }
    }
}

impl From<Mark> for Side {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Side::Player,
            Mark::O => Side::Opponent,
        }
    }
}

/// Result of a completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum RoundOutcome {
    /// The player completed a line.
    #[display("player")]
    Player,
    /// The CPU completed a line.
    #[serde(rename = "cpu")]
    #[display("cpu")]
    Opponent,
    /// Full board, no line.
    #[display("draw")]
    Draw,
}

impl RoundOutcome {
    /// The side that won the round, if any.
    pub fn winner(self) -> Option<Side> {
        match self {
            RoundOutcome::Player => Some(Side::Player),
            RoundOutcome::Opponent => Some(Side::Opponent),
            RoundOutcome::Draw => None,
        }
    }
}

impl From<Side> for RoundOutcome {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => RoundOutcome::Player,
            Side::Opponent => RoundOutcome::Opponent,
        }
    }
}

/// How a finished series ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum SeriesOutcome {
    /// A side reached the win threshold.
    #[display("{} takes the series", _0)]
    Winner(Side),
    /// The round cap was reached with nobody at the threshold.
    #[display("series tied")]
    Tied,
}

/// Cumulative round wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Rounds won by the player.
    pub player: u32,
    /// Rounds won by the CPU.
    #[serde(rename = "cpu")]
    pub opponent: u32,
}

impl Scores {
    /// Wins for `side`.
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Opponent => self.opponent,
        }
    }

    /// Adds a win for `side` and returns the new total.
    pub fn increment(&mut self, side: Side) -> u32 {
        let score = match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        };
        *score += 1;
        *score
    }
}

/// A completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct HistoryEntry {
    /// Round number (1-based).
    pub round: u32,
    /// How it ended.
    pub result: RoundOutcome,
}

/// Rules of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SeriesConfig {
    /// Round cap.
    #[serde(default = "default_max_rounds")]
    max_rounds: u32,
    /// Round wins that take the series.
    #[serde(default = "default_wins_to_take")]
    wins_to_take: u32,
}

fn default_max_rounds() -> u32 {
    5
}

fn default_wins_to_take() -> u32 {
    3
}

impl SeriesConfig {
    /// Creates and validates a configuration.
    #[track_caller]
    pub fn new(max_rounds: u32, wins_to_take: u32) -> Result<Self, SeriesConfigError> {
        let config = Self {
            max_rounds,
            wins_to_take,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that both limits are positive and the threshold is reachable.
    #[track_caller]
    pub fn validate(&self) -> Result<(), SeriesConfigError> {
        if self.max_rounds == 0 || self.wins_to_take == 0 {
            return Err(SeriesConfigError::new(
                "max_rounds and wins_to_take must be at least 1",
            ));
        }
        if self.wins_to_take > self.max_rounds {
            return Err(SeriesConfigError::new(format!(
                "wins_to_take ({}) exceeds max_rounds ({})",
                self.wins_to_take, self.max_rounds
            )));
        }
        Ok(())
    }
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            wins_to_take: default_wins_to_take(),
        }
    }
}

/// Invalid series rules.
#[derive(Debug, Clone, Display, Error)]
#[display("Series config error: {} at {}:{}", message, file, line)]
pub struct SeriesConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SeriesConfigError {
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

/// Where the series currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    /// Waiting for the player to pick a cell.
    PlayerTurn,
    /// The CPU's reply has been requested and not yet resolved.
    AwaitingMoveResponse,
    /// The round is decided; the next round can start.
    RoundOver,
    /// The series is decided; only reset is accepted.
    SeriesOver,
}

/// Complete state of a series.
///
/// This is also the persisted form; see [`SeriesState::restore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesState {
    pub(super) board: Board,
    pub(super) turn: Side,
    pub(super) round: u32,
    pub(super) scores: Scores,
    pub(super) round_result: Option<RoundOutcome>,
    pub(super) series_winner: Option<Side>,
    pub(super) history: Vec<HistoryEntry>,
}

impl SeriesState {
    /// Fresh series: empty board, round 1, no scores.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Side::Player,
            round: 1,
            scores: Scores::default(),
            round_result: None,
            series_winner: None,
            history: Vec::new(),
        }
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move.
    pub fn turn(&self) -> Side {
        self.turn
    }

    /// Current round number (1-based).
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Cumulative wins.
    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// Result of the current round, `None` while undecided.
    pub fn round_result(&self) -> Option<RoundOutcome> {
        self.round_result
    }

    /// Side that reached the win threshold, if any.
    pub fn series_winner(&self) -> Option<Side> {
        self.series_winner
    }

    /// Completed rounds in order.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Whether no further round can be played.
    pub fn is_over(&self, config: &SeriesConfig) -> bool {
        self.series_winner.is_some()
            || (self.round_result.is_some() && self.round >= config.max_rounds)
    }

    /// Final outcome once the series is over.
    pub fn outcome(&self, config: &SeriesConfig) -> Option<SeriesOutcome> {
        if !self.is_over(config) {
            return None;
        }
        Some(
            self.series_winner
                .map_or(SeriesOutcome::Tied, SeriesOutcome::Winner),
        )
    }

    /// Phase ignoring any in-flight request.
    pub fn phase(&self, config: &SeriesConfig) -> Phase {
        if self.is_over(config) {
            Phase::SeriesOver
        } else if self.round_result.is_some() {
            Phase::RoundOver
        } else if self.turn == Side::Opponent {
            Phase::AwaitingMoveResponse
        } else {
            Phase::PlayerTurn
        }
    }

    /// Places `side`'s mark. The caller has checked the square is empty.
    pub(super) fn place(&mut self, pos: Position, side: Side) {
        self.board.set(pos, Square::Occupied(side.mark()));
    }

    /// Evaluates the board after a move; `Some` once the round is decided.
    pub(super) fn evaluate(&self) -> Option<RoundOutcome> {
        if let Some(mark) = check_winner(&self.board) {
            Some(Side::from(mark).into())
        } else if is_full(&self.board) {
            Some(RoundOutcome::Draw)
        } else {
            None
        }
    }

    /// Enters round-over: records history, scores, and the series winner.
    #[instrument(skip(self, config), fields(round = self.round))]
    pub(super) fn finish_round(&mut self, outcome: RoundOutcome, config: &SeriesConfig) {
        self.round_result = Some(outcome);
        self.turn = Side::Player;
        self.history.push(HistoryEntry::new(self.round, outcome));

        if let Some(side) = outcome.winner() {
            let score = self.scores.increment(side);
            debug!(%side, score, "Round won");
            if score >= config.wins_to_take {
                info!(%side, score, "Series decided");
                self.series_winner = Some(side);
            }
        }
    }

    /// Starts the next round on a cleared board.
    pub(super) fn start_next_round(&mut self, config: &SeriesConfig) {
        self.round = (self.round + 1).min(config.max_rounds);
        self.board = Board::new();
        self.round_result = None;
        self.turn = Side::Player;
    }
}

impl Default for SeriesState {
    fn default() -> Self {
        Self::new()
    }
}
