//! Board model and move collaborators for duelboard.
//!
//! This crate knows nothing about turns, selections or background work.
//! It provides:
//!
//! - **Model**: [`Square`], [`Side`], [`Piece`], [`BoardState`], [`Move`], [`Outcome`]
//! - **Seams**: [`MoveOracle`] (legality, game end) and [`SearchEngine`] (move choice)
//! - **Reference collaborators**: [`StandardRules`] and [`MaterialSearch`]

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod oracle;
mod outcome;
mod rules;
mod search;
mod square;
mod types;

pub use action::Move;
pub use board::{BoardError, BoardState};
pub use oracle::{MoveOracle, OracleError, SearchEngine, SearchError};
pub use outcome::Outcome;
pub use rules::StandardRules;
pub use search::{MATE_SCORE, MaterialSearch};
pub use square::{MAX_BOARD_SIZE, STANDARD_BOARD_SIZE, Square, SquareParseError};
pub use types::{Piece, PieceKind, Side};
