//! Tic-tac-toe board model, rules and CPU opponents.

pub mod opponent;
mod position;
pub mod rules;
mod types;

pub use opponent::{Difficulty, TieredOpponent, select_move};
pub use position::Position;
pub use rules::{check_winner, is_draw, is_full};
pub use types::{Board, Mark, Square};
