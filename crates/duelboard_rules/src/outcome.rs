//! Terminal game results.

use super::types::Side;
use serde::{Deserialize, Serialize};

/// Outcome of a finished game. Once reached, no further moves are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The side to move was mated; carries the winning side.
    Checkmate(Side),
    /// The side to move has no legal move but is not in check.
    Stalemate,
    /// Drawn by material or by the ply limit.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Checkmate(side) => Some(*side),
            Outcome::Stalemate | Outcome::Draw => None,
        }
    }

    /// Returns true if nobody won.
    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Checkmate(side) => write!(f, "Checkmate, {} wins", side),
            Outcome::Stalemate => write!(f, "Stalemate"),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}
