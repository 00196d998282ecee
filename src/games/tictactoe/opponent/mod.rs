//! CPU opponent strategies.
//!
//! Each [`Difficulty`] maps to one strategy. [`TieredOpponent`] answers a
//! [`MoveRequest`] the same way whether it runs in-process or behind the
//! HTTP move service.

mod difficulty;
pub mod greedy;
pub mod minimax;

pub use difficulty::Difficulty;
pub use greedy::select_move;

use super::rules::{check_winner, is_full};
use super::{Board, Mark, Position};
use crate::protocol::{MoveRequest, MoveResponse};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::{debug, info, instrument, warn};

/// Answers move requests at the requested tier.
///
/// The hard tier can be rationed: with a budget set, each hard answer
/// spends one unit, and once the budget is gone hard requests are served
/// at [`Difficulty::Medium`] with the fallback flag raised.
#[derive(Debug)]
pub struct TieredOpponent {
    hard_budget: Option<u32>,
    rng: StdRng,
}

impl TieredOpponent {
    /// Creates an opponent with an optional hard-tier budget.
    #[instrument]
    pub fn new(hard_budget: Option<u32>) -> Self {
        Self {
            hard_budget,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates an opponent with a fixed random seed for the easy tier.
    #[instrument]
    pub fn seeded(hard_budget: Option<u32>, seed: u64) -> Self {
        Self {
            hard_budget,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Remaining hard-tier answers, `None` when unlimited.
    pub fn hard_budget(&self) -> Option<u32> {
        self.hard_budget
    }

    /// Picks a move for `O` at `difficulty` without touching the budget.
    #[instrument(skip(self, board))]
    pub fn pick(&mut self, board: &Board, difficulty: Difficulty) -> Option<Position> {
        match difficulty {
            Difficulty::Easy => Position::valid_moves(board).choose(&mut self.rng).copied(),
            Difficulty::Medium => select_move(board),
            Difficulty::Hard => minimax::best_move(board, Mark::O),
        }
    }

    /// Answers a move request.
    ///
    /// A board that is already decided is echoed back with its outcome and
    /// no move.
    #[instrument(skip(self, request), fields(difficulty = %request.difficulty))]
    pub fn respond(&mut self, request: &MoveRequest) -> MoveResponse {
        let board = &request.board;
        let (difficulty, fallback) = self.resolve_tier(request.difficulty);

        let mut response = if check_winner(board).is_some() || is_full(board) {
            debug!("Board already decided, echoing");
            MoveResponse::with_board(board)
        } else {
            match self.pick(board, difficulty) {
                Some(pos) => {
                    let next = board.with(pos, Mark::O);
                    info!(position = %pos, %difficulty, "CPU move");
                    let mut response = MoveResponse::with_board(&next);
                    response.cell = Some(pos.to_index());
                    response
                }
                None => {
                    warn!("No move available on an undecided board");
                    MoveResponse::with_board(board)
                }
            }
        };

        if let Some(played) = response.parsed_board() {
            response.winner = check_winner(&played);
            response.draw = response.winner.is_none() && is_full(&played);
        }
        response.difficulty_used = Some(difficulty);
        response.fallback = fallback;
        response
    }

    /// Applies the hard-tier budget. Returns the tier to use and whether
    /// it was downgraded.
    fn resolve_tier(&mut self, requested: Difficulty) -> (Difficulty, bool) {
        if requested != Difficulty::Hard {
            return (requested, false);
        }
        match self.hard_budget {
            None => (Difficulty::Hard, false),
            Some(0) => {
                warn!("Hard tier budget exhausted, falling back to medium");
                (Difficulty::Medium, true)
            }
            Some(remaining) => {
                self.hard_budget = Some(remaining - 1);
                debug!(remaining = remaining - 1, "Spent hard tier budget");
                (Difficulty::Hard, false)
            }
        }
    }
}

impl Default for TieredOpponent {
    fn default() -> Self {
        Self::new(None)
    }
}
