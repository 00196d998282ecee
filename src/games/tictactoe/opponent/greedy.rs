//! Greedy rule-based opponent.
//!
//! Two-ply heuristic: take a winning move, otherwise block the player's
//! winning move, otherwise play the first free cell of a fixed priority
//! order. A player who sets up a fork beats it.

use super::super::rules::{LINES, is_full};
use super::super::{Board, Mark, Position, Square};
use tracing::{debug, instrument};

/// Fixed tie-break order: center, corners, edges.
pub const FALLBACK_ORDER: [Position; 9] = [
    Position::Center,
    Position::TopLeft,
    Position::TopRight,
    Position::BottomLeft,
    Position::BottomRight,
    Position::TopCenter,
    Position::MiddleLeft,
    Position::MiddleRight,
    Position::BottomCenter,
];

/// Selects the opponent's (`O`) next move.
///
/// Returns `None` only when the board is full.
#[instrument(skip(board))]
pub fn select_move(board: &Board) -> Option<Position> {
    if is_full(board) {
        return None;
    }

    if let Some(pos) = completing_move(board, Mark::O) {
        debug!(position = %pos, "Taking winning move");
        return Some(pos);
    }

    if let Some(pos) = completing_move(board, Mark::X) {
        debug!(position = %pos, "Blocking player");
        return Some(pos);
    }

    first_free(board)
}

/// First empty square of [`FALLBACK_ORDER`].
pub fn first_free(board: &Board) -> Option<Position> {
    FALLBACK_ORDER.iter().copied().find(|pos| board.is_empty(*pos))
}

/// Finds the empty square of the first line holding two `mark`s and one gap.
pub fn completing_move(board: &Board, mark: Mark) -> Option<Position> {
    LINES.iter().find_map(|line| {
        let owned = line
            .iter()
            .filter(|pos| board.get(**pos) == Square::Occupied(mark))
            .count();
        let gap = line.iter().copied().find(|pos| board.is_empty(*pos));
        if owned == 2 { gap } else { None }
    })
}
