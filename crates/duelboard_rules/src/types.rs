//! Sides and pieces.

use super::square::Square;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// One of the two competing parties.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Light side (moves first).
    Light,
    /// Dark side.
    Dark,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::Light => Side::Dark,
            Side::Dark => Side::Light,
        }
    }

    /// Direction pawns of this side advance in, as a rank delta.
    pub fn forward(self) -> i8 {
        match self {
            Side::Light => 1,
            Side::Dark => -1,
        }
    }
}

/// The kind of a piece, which determines how it moves.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// King.
    King,
    /// Queen.
    Queen,
    /// Rook.
    Rook,
    /// Bishop.
    Bishop,
    /// Knight.
    Knight,
    /// Pawn.
    Pawn,
}

impl PieceKind {
    /// Material value in centipawns. The king is priceless and scores zero.
    pub fn value(self) -> i32 {
        match self {
            PieceKind::King => 0,
            PieceKind::Queen => 900,
            PieceKind::Rook => 500,
            PieceKind::Bishop => 330,
            PieceKind::Knight => 320,
            PieceKind::Pawn => 100,
        }
    }

    /// Upper-case letter used in text renderings.
    pub fn letter(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }
}

/// A piece standing on the board.
///
/// `square` always equals the key the piece is stored under in its
/// [`BoardState`](crate::BoardState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Piece {
    /// Owning side.
    pub side: Side,
    /// Movement kind.
    pub kind: PieceKind,
    /// Current square.
    pub square: Square,
}

impl Piece {
    /// Returns the letter for this piece: upper case for light, lower case for dark.
    pub fn symbol(&self) -> char {
        match self.side {
            Side::Light => self.kind.letter(),
            Side::Dark => self.kind.letter().to_ascii_lowercase(),
        }
    }
}
