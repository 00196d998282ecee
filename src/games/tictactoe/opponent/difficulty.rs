//! Difficulty tiers for the CPU opponent.

use serde::{Deserialize, Serialize};

/// Strength of the CPU opponent.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Plays a random free square.
    Easy,
    /// Greedy win/block/priority heuristic.
    #[default]
    Medium,
    /// Perfect play.
    Hard,
}

impl Difficulty {
    /// Next tier in the cycle easy -> medium -> hard -> easy.
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}
