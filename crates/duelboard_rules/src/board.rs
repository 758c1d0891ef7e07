//! Sparse board representation.

use super::action::Move;
use super::square::{MAX_BOARD_SIZE, STANDARD_BOARD_SIZE, Square};
use super::types::{Piece, PieceKind, Side};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use tracing::instrument;

/// Errors raised while building or mutating a board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// Board dimension outside `1..=26`.
    #[display("Board size {} is outside 1..={}", _0, MAX_BOARD_SIZE)]
    InvalidSize(u8),

    /// Square lies off the board.
    #[display("Square {} is off the board", _0)]
    OutOfBounds(Square),

    /// Square already holds a piece.
    #[display("Square {} is already occupied", _0)]
    Occupied(Square),

    /// No piece stands on the origin square.
    #[display("No piece on {}", _0)]
    NoPiece(Square),

    /// The destination holds a piece of the mover's own side.
    #[display("Move {} would capture a friendly piece", _0)]
    FriendlyCapture(Move),
}

impl std::error::Error for BoardError {}

/// Mapping from square to at most one piece.
///
/// Every stored piece's `square` equals its key; only [`BoardState::place`]
/// and [`BoardState::apply_move`] mutate the map, and both keep it so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    size: u8,
    pieces: BTreeMap<Square, Piece>,
}

impl BoardState {
    /// Creates an empty board of dimension `size`.
    #[instrument]
    pub fn empty(size: u8) -> Result<Self, BoardError> {
        if size == 0 || size > MAX_BOARD_SIZE {
            return Err(BoardError::InvalidSize(size));
        }
        Ok(Self {
            size,
            pieces: BTreeMap::new(),
        })
    }

    /// Creates the standard 8x8 chess opening position.
    #[instrument]
    pub fn standard() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut pieces = BTreeMap::new();
        let last = STANDARD_BOARD_SIZE - 1;
        for (file, kind) in (0u8..).zip(BACK_RANK) {
            for (side, back, pawns) in [(Side::Light, 0, 1), (Side::Dark, last, last - 1)] {
                let home = Square::new(file, back);
                let pawn = Square::new(file, pawns);
                pieces.insert(home, Piece::new(side, kind, home));
                pieces.insert(pawn, Piece::new(side, PieceKind::Pawn, pawn));
            }
        }

        Self {
            size: STANDARD_BOARD_SIZE,
            pieces,
        }
    }

    /// Creates a kings-and-pawns position for any board of dimension 4 or more.
    ///
    /// Each side has its king on the middle file of its home rank and a full
    /// row of pawns in front.
    #[instrument]
    pub fn pawn_race(size: u8) -> Result<Self, BoardError> {
        if size < 4 {
            return Err(BoardError::InvalidSize(size));
        }
        let mut board = Self::empty(size)?;
        let last = size - 1;
        for side in Side::iter() {
            let (home, pawns) = match side {
                Side::Light => (0, 1),
                Side::Dark => (last, last - 1),
            };
            board.place(side, PieceKind::King, Square::new(size / 2, home))?;
            for file in 0..size {
                board.place(side, PieceKind::Pawn, Square::new(file, pawns))?;
            }
        }
        Ok(board)
    }

    /// Returns the board dimension.
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Checks whether `square` lies on this board.
    pub fn contains(&self, square: Square) -> bool {
        square.in_bounds(self.size)
    }

    /// Puts a new piece on an empty square.
    pub fn place(&mut self, side: Side, kind: PieceKind, square: Square) -> Result<(), BoardError> {
        if !self.contains(square) {
            return Err(BoardError::OutOfBounds(square));
        }
        if self.pieces.contains_key(&square) {
            return Err(BoardError::Occupied(square));
        }
        self.pieces.insert(square, Piece::new(side, kind, square));
        Ok(())
    }

    /// Builder form of [`BoardState::place`].
    pub fn with(mut self, side: Side, kind: PieceKind, square: Square) -> Result<Self, BoardError> {
        self.place(side, kind, square)?;
        Ok(self)
    }

    /// Returns the piece on `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.pieces.get(&square)
    }

    /// Iterates all pieces in square order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    /// Iterates the pieces of one side in square order.
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = &Piece> {
        self.pieces.values().filter(move |p| p.side == side)
    }

    /// Returns the square of `side`'s king, if it has one.
    pub fn king_of(&self, side: Side) -> Option<Square> {
        self.pieces_of(side)
            .find(|p| p.kind == PieceKind::King)
            .map(|p| p.square)
    }

    /// Returns true when a pawn of `side` standing on `rank` has reached the far edge.
    pub fn is_promotion_rank(&self, side: Side, rank: u8) -> bool {
        match side {
            Side::Light => rank + 1 == self.size,
            Side::Dark => rank == 0,
        }
    }

    /// Transfers the piece on `mv.from` to `mv.to`, capturing whatever stood there.
    ///
    /// Movement rules are not checked here; that is the oracle's job. A pawn
    /// landing on the far rank becomes a queen. Returns the captured piece.
    pub fn apply_move(&mut self, mv: Move) -> Result<Option<Piece>, BoardError> {
        if !self.contains(mv.to) {
            return Err(BoardError::OutOfBounds(mv.to));
        }
        let mover = *self.pieces.get(&mv.from).ok_or(BoardError::NoPiece(mv.from))?;
        if self.piece_at(mv.to).is_some_and(|p| p.side == mover.side) {
            return Err(BoardError::FriendlyCapture(mv));
        }

        self.pieces.remove(&mv.from);
        let kind = if mover.kind == PieceKind::Pawn && self.is_promotion_rank(mover.side, mv.to.rank) {
            PieceKind::Queen
        } else {
            mover.kind
        };
        Ok(self.pieces.insert(mv.to, Piece::new(mover.side, kind, mv.to)))
    }

    /// Checks the square/key consistency of every stored piece.
    pub fn is_consistent(&self) -> bool {
        self.pieces
            .iter()
            .all(|(square, piece)| piece.square == *square && square.in_bounds(self.size))
    }

    /// Formats the board as text, highest rank first.
    ///
    /// Light pieces are upper case, dark pieces lower case, empty squares `.`.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for rank in (0..self.size).rev() {
            result.push_str(&format!("{:>2} ", u16::from(rank) + 1));
            for file in 0..self.size {
                let symbol = self
                    .piece_at(Square::new(file, rank))
                    .map_or('.', Piece::symbol);
                result.push(symbol);
                if file + 1 < self.size {
                    result.push(' ');
                }
            }
            result.push('\n');
        }
        result.push_str("   ");
        let files: Vec<String> = (0..self.size)
            .map(|file| char::from(b'a' + file).to_string())
            .collect();
        result.push_str(&files.join(" "));
        result
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::standard()
    }
}
