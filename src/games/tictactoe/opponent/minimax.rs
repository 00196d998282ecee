//! Perfect-play opponent.
//!
//! Full game-tree negamax with a per-search transposition table. Scores
//! prefer faster wins and slower losses, so the opponent finishes a won
//! game instead of wandering.

use super::super::rules::{check_winner, is_full};
use super::super::{Board, Mark, Position};
use super::greedy::FALLBACK_ORDER;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Picks the best move for `mark`. Ties go to the earliest square of the
/// fallback order. Returns `None` on a finished board.
#[instrument(skip(board))]
pub fn best_move(board: &Board, mark: Mark) -> Option<Position> {
    if check_winner(board).is_some() || is_full(board) {
        return None;
    }

    let mut table = HashMap::new();
    let mut best: Option<(Position, i32)> = None;
    for pos in FALLBACK_ORDER {
        if !board.is_empty(pos) {
            continue;
        }
        let score = -negamax(&board.with(pos, mark), mark.opponent(), &mut table);
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((pos, score));
        }
    }

    debug!(best = ?best, explored = table.len(), "Search complete");
    best.map(|(pos, _)| pos)
}

/// Value of `board` for the side to move.
fn negamax(board: &Board, to_move: Mark, table: &mut HashMap<Board, i32>) -> i32 {
    if let Some(score) = table.get(board) {
        return *score;
    }

    let empties = Position::valid_moves(board);
    let score = if let Some(winner) = check_winner(board) {
        // The side that just moved won; sooner wins leave more empties.
        let magnitude = empties.len() as i32 + 1;
        if winner == to_move { magnitude } else { -magnitude }
    } else if empties.is_empty() {
        0
    } else {
        empties
            .iter()
            .map(|pos| -negamax(&board.with(*pos, to_move), to_move.opponent(), table))
            .max()
            .unwrap_or(0)
    };

    table.insert(board.clone(), score);
    score
}
