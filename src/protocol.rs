//! Wire types for the opponent-move exchange.
//!
//! Field names are camelCase on the wire. Every response field is
//! optional: a client must treat a response as untrusted input and
//! validate the board before using it.

use crate::games::tictactoe::{Board, Difficulty, Mark, Position};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Rounds of player moves kept in [`MoveRequest::history`].
pub const MOVE_HISTORY_ROUNDS: usize = 5;

/// Request for the CPU's reply to the player's latest move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Board after the player's move.
    pub board: Board,
    /// Requested difficulty tier.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// The player's own cell indices, one list per recent round.
    #[serde(default)]
    pub history: Vec<Vec<usize>>,
}

/// The CPU's reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    /// Board after the CPU's move, untrusted until validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<serde_json::Value>,
    /// Index the CPU played, informational only.
    #[serde(default, rename = "move", skip_serializing_if = "Option::is_none")]
    pub cell: Option<usize>,
    /// Winner on the returned board, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Mark>,
    /// Whether the returned board is a draw.
    #[serde(default)]
    pub draw: bool,
    /// Tier that actually produced the move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_used: Option<Difficulty>,
    /// Set when the requested tier was downgraded.
    #[serde(default, alias = "geminiFallback")]
    pub fallback: bool,
}

impl MoveResponse {
    /// Builds a response carrying `board`.
    #[instrument(skip(board))]
    pub fn with_board(board: &Board) -> Self {
        Self {
            board: serde_json::to_value(board).ok(),
            ..Self::default()
        }
    }

    /// Parses and validates the returned board.
    pub fn parsed_board(&self) -> Option<Board> {
        self.board.as_ref().and_then(Board::from_wire)
    }

    /// The played cell as a position, if valid.
    pub fn position(&self) -> Option<Position> {
        self.cell.and_then(Position::from_index)
    }
}
