//! Reference chess movement rules.
//!
//! Covers king, queen, rook, bishop, knight and pawn movement (single and
//! double pushes, diagonal captures, promotion through [`BoardState`]),
//! and filters out any move that leaves the mover's king attacked.
//! Castling and en passant are not modelled. Any board dimension works;
//! pawns double-step from the second rank of their side.

use super::action::Move;
use super::board::BoardState;
use super::oracle::{MoveOracle, OracleError};
use super::outcome::Outcome;
use super::square::Square;
use super::types::{Piece, PieceKind, Side};
use std::collections::BTreeSet;
use tracing::{instrument, trace};

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Standard chess movement as a [`MoveOracle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    /// Creates the rule set.
    pub fn new() -> Self {
        Self
    }

    /// Returns every legal move for `side`, in square order.
    pub fn legal_moves(&self, board: &BoardState, side: Side) -> Vec<Move> {
        let pieces: Vec<Piece> = board.pieces_of(side).copied().collect();
        pieces
            .iter()
            .flat_map(|piece| {
                self.legal_targets(board, piece)
                    .into_iter()
                    .map(move |to| Move::new(piece.square, to))
            })
            .collect()
    }

    /// Checks whether `side`'s king is attacked. A side without a king is never in check.
    pub fn is_in_check(&self, board: &BoardState, side: Side) -> bool {
        board
            .king_of(side)
            .is_some_and(|king| self.is_attacked(board, king, side.opponent()))
    }

    /// Checks whether any piece of `by` attacks `square`.
    pub fn is_attacked(&self, board: &BoardState, square: Square, by: Side) -> bool {
        board
            .pieces_of(by)
            .any(|piece| attacks(board, piece).contains(&square))
    }

    fn legal_targets(&self, board: &BoardState, piece: &Piece) -> Vec<Square> {
        pseudo_targets(board, piece)
            .into_iter()
            .filter(|&to| {
                let mut next = board.clone();
                next.apply_move(Move::new(piece.square, to)).is_ok()
                    && !self.is_in_check(&next, piece.side)
            })
            .collect()
    }
}

impl MoveOracle for StandardRules {
    #[instrument(skip(self, board), fields(square = %piece.square))]
    fn legal_destinations(
        &self,
        piece: &Piece,
        board: &BoardState,
    ) -> Result<BTreeSet<Square>, OracleError> {
        if board.piece_at(piece.square) != Some(piece) {
            return Err(OracleError::new(format!(
                "{} {} is not on {}",
                piece.side, piece.kind, piece.square
            )));
        }
        let targets: BTreeSet<Square> = self.legal_targets(board, piece).into_iter().collect();
        trace!(count = targets.len(), "Computed legal destinations");
        Ok(targets)
    }

    #[instrument(skip(self, board))]
    fn evaluate_outcome(
        &self,
        board: &BoardState,
        side_to_move: Side,
    ) -> Result<Option<Outcome>, OracleError> {
        if self.legal_moves(board, side_to_move).is_empty() {
            return Ok(Some(if self.is_in_check(board, side_to_move) {
                Outcome::Checkmate(side_to_move.opponent())
            } else {
                Outcome::Stalemate
            }));
        }
        if board.pieces().all(|p| p.kind == PieceKind::King) {
            return Ok(Some(Outcome::Draw));
        }
        Ok(None)
    }
}

/// Destinations ignoring king safety.
fn pseudo_targets(board: &BoardState, piece: &Piece) -> Vec<Square> {
    let size = board.size();
    let free_or_enemy = |sq: &Square| board.piece_at(*sq).is_none_or(|p| p.side != piece.side);

    match piece.kind {
        PieceKind::Pawn => {
            let mut targets = Vec::new();
            let forward = piece.side.forward();
            if let Some(one) = piece.square.offset(0, forward, size)
                && board.piece_at(one).is_none()
            {
                targets.push(one);
                if is_pawn_home(board, piece)
                    && let Some(two) = one.offset(0, forward, size)
                    && board.piece_at(two).is_none()
                {
                    targets.push(two);
                }
            }
            for file_step in [-1, 1] {
                if let Some(diag) = piece.square.offset(file_step, forward, size)
                    && board.piece_at(diag).is_some_and(|p| p.side != piece.side)
                {
                    targets.push(diag);
                }
            }
            targets
        }
        _ => attacks(board, piece)
            .into_iter()
            .filter(free_or_enemy)
            .collect(),
    }
}

/// Squares a piece attacks, including squares held by either side.
fn attacks(board: &BoardState, piece: &Piece) -> Vec<Square> {
    let size = board.size();
    let origin = piece.square;
    let steps = |deltas: &[(i8, i8)]| -> Vec<Square> {
        deltas
            .iter()
            .filter_map(|&(df, dr)| origin.offset(df, dr, size))
            .collect()
    };
    let forward = piece.side.forward();

    match piece.kind {
        PieceKind::King => {
            let mut around = steps(&ORTHOGONAL[..]);
            around.extend(steps(&DIAGONAL[..]));
            around
        }
        PieceKind::Knight => steps(&KNIGHT_JUMPS[..]),
        PieceKind::Rook => slide(board, origin, &ORTHOGONAL),
        PieceKind::Bishop => slide(board, origin, &DIAGONAL),
        PieceKind::Queen => {
            let mut lines = slide(board, origin, &ORTHOGONAL);
            lines.extend(slide(board, origin, &DIAGONAL));
            lines
        }
        PieceKind::Pawn => steps(&[(-1, forward), (1, forward)][..]),
    }
}

/// Walks each direction until the edge or the first occupied square (inclusive).
fn slide(board: &BoardState, origin: Square, directions: &[(i8, i8)]) -> Vec<Square> {
    let mut squares = Vec::new();
    for &(df, dr) in directions {
        let mut cursor = origin;
        while let Some(next) = cursor.offset(df, dr, board.size()) {
            squares.push(next);
            if board.piece_at(next).is_some() {
                break;
            }
            cursor = next;
        }
    }
    squares
}

fn is_pawn_home(board: &BoardState, piece: &Piece) -> bool {
    match piece.side {
        Side::Light => piece.square.rank == 1,
        Side::Dark => board.size() >= 2 && piece.square.rank == board.size() - 2,
    }
}
