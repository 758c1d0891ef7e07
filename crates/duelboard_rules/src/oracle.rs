//! Collaborator seams: move legality and move choice.
//!
//! The game shell never decides legality or picks engine moves itself. It
//! asks a [`MoveOracle`] and a [`SearchEngine`], both of which may be
//! swapped for other rule sets or test doubles.

use super::action::Move;
use super::board::BoardState;
use super::outcome::Outcome;
use super::square::Square;
use super::types::{Piece, Side};
use derive_more::{Display, Error};
use std::collections::BTreeSet;

/// Legality and game-end authority.
pub trait MoveOracle: Send + Sync {
    /// Returns every square `piece` may legally move to on `board`.
    fn legal_destinations(
        &self,
        piece: &Piece,
        board: &BoardState,
    ) -> Result<BTreeSet<Square>, OracleError>;

    /// Reports whether the game has ended with `side_to_move` to play.
    fn evaluate_outcome(
        &self,
        board: &BoardState,
        side_to_move: Side,
    ) -> Result<Option<Outcome>, OracleError>;
}

/// Move chooser for automated sides.
pub trait SearchEngine: Send + Sync {
    /// Picks a move for `side_to_move`, or `None` if it has no legal move.
    ///
    /// May block for as long as the search takes.
    fn choose_move(
        &self,
        board: &BoardState,
        side_to_move: Side,
        depth: u8,
    ) -> Result<Option<Move>, SearchError>;
}

/// Move oracle failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error with caller location tracking.
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

/// Search engine failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Search error: {} at {}:{}", message, file, line)]
pub struct SearchError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl SearchError {
    /// Creates a new search error with caller location tracking.
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

impl From<OracleError> for SearchError {
    #[track_caller]
    fn from(err: OracleError) -> Self {
        Self::new(format!("Oracle failed during search: {}", err.message))
    }
}
