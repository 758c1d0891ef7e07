//! Tests for the board model and the reference move oracle.

use duelboard_rules::{
    BoardError, BoardState, Move, MoveOracle, Outcome, Piece, PieceKind, Side, Square,
    StandardRules,
};
use std::collections::BTreeSet;
use strum::IntoEnumIterator;

fn sq(text: &str) -> Square {
    text.parse().expect("valid square")
}

fn squares(list: &[&str]) -> BTreeSet<Square> {
    list.iter().map(|s| sq(s)).collect()
}

#[test]
fn test_standard_layout() {
    let board = BoardState::standard();
    assert_eq!(board.size(), 8);
    assert_eq!(board.pieces().count(), 32);
    assert_eq!(board.king_of(Side::Light), Some(sq("e1")));
    assert_eq!(board.king_of(Side::Dark), Some(sq("e8")));
    assert!(board.is_consistent());
}

#[test]
fn test_opening_has_twenty_moves() {
    let board = BoardState::standard();
    let rules = StandardRules::new();
    for side in Side::iter() {
        assert_eq!(rules.legal_moves(&board, side).len(), 20, "{side} opening moves");
    }
}

#[test]
fn test_place_rejects_occupied_and_off_board() {
    let mut board = BoardState::empty(4).unwrap();
    board.place(Side::Light, PieceKind::Rook, sq("a1")).unwrap();

    assert_eq!(
        board.place(Side::Dark, PieceKind::Rook, sq("a1")),
        Err(BoardError::Occupied(sq("a1")))
    );
    assert_eq!(
        board.place(Side::Dark, PieceKind::Rook, sq("e1")),
        Err(BoardError::OutOfBounds(sq("e1")))
    );
    assert_eq!(BoardState::empty(0), Err(BoardError::InvalidSize(0)));
}

#[test]
fn test_apply_move_keeps_square_consistent() {
    let mut board = BoardState::standard();
    let captured = board.apply_move(Move::new(sq("e2"), sq("e4"))).unwrap();

    assert!(captured.is_none());
    assert!(board.piece_at(sq("e2")).is_none());
    assert_eq!(
        board.piece_at(sq("e4")),
        Some(&Piece::new(Side::Light, PieceKind::Pawn, sq("e4")))
    );
    assert!(board.is_consistent());
}

#[test]
fn test_apply_move_rejects_friendly_capture() {
    let mut board = BoardState::standard();
    let mv = Move::new(sq("a1"), sq("a2"));
    assert_eq!(board.apply_move(mv), Err(BoardError::FriendlyCapture(mv)));
}

#[test]
fn test_pawn_promotes_on_far_rank() {
    let mut board = BoardState::empty(8)
        .unwrap()
        .with(Side::Light, PieceKind::Pawn, sq("a7"))
        .unwrap();
    board.apply_move(Move::new(sq("a7"), sq("a8"))).unwrap();
    assert_eq!(board.piece_at(sq("a8")).map(|p| p.kind), Some(PieceKind::Queen));
}

#[test]
fn test_knight_in_corner() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Light, PieceKind::Knight, sq("a1"))
        .unwrap();
    let knight = *board.piece_at(sq("a1")).unwrap();

    let dests = StandardRules::new().legal_destinations(&knight, &board).unwrap();
    assert_eq!(dests, squares(&["b3", "c2"]));
}

#[test]
fn test_pawn_pushes_and_captures() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Light, PieceKind::Pawn, sq("d2"))
        .unwrap()
        .with(Side::Dark, PieceKind::Knight, sq("e3"))
        .unwrap()
        .with(Side::Light, PieceKind::Knight, sq("c3"))
        .unwrap();
    let pawn = *board.piece_at(sq("d2")).unwrap();

    let dests = StandardRules::new().legal_destinations(&pawn, &board).unwrap();
    assert_eq!(dests, squares(&["d3", "d4", "e3"]));
}

#[test]
fn test_pinned_rook_stays_on_file() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Light, PieceKind::King, sq("e1"))
        .unwrap()
        .with(Side::Light, PieceKind::Rook, sq("e2"))
        .unwrap()
        .with(Side::Dark, PieceKind::Rook, sq("e8"))
        .unwrap();
    let rook = *board.piece_at(sq("e2")).unwrap();

    let dests = StandardRules::new().legal_destinations(&rook, &board).unwrap();
    assert_eq!(dests, squares(&["e3", "e4", "e5", "e6", "e7", "e8"]));
}

#[test]
fn test_small_board_bounds_moves() {
    let board = BoardState::empty(3)
        .unwrap()
        .with(Side::Light, PieceKind::Queen, sq("b2"))
        .unwrap();
    let queen = *board.piece_at(sq("b2")).unwrap();

    let dests = StandardRules::new().legal_destinations(&queen, &board).unwrap();
    assert_eq!(dests.len(), 8);
}

#[test]
fn test_legal_destinations_rejects_stray_piece() {
    let board = BoardState::empty(8).unwrap();
    let ghost = Piece::new(Side::Light, PieceKind::Rook, sq("a1"));
    assert!(StandardRules::new().legal_destinations(&ghost, &board).is_err());
}

#[test]
fn test_back_rank_checkmate() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Dark, PieceKind::King, sq("h8"))
        .unwrap()
        .with(Side::Dark, PieceKind::Pawn, sq("g7"))
        .unwrap()
        .with(Side::Dark, PieceKind::Pawn, sq("h7"))
        .unwrap()
        .with(Side::Light, PieceKind::Rook, sq("a8"))
        .unwrap()
        .with(Side::Light, PieceKind::King, sq("a1"))
        .unwrap();

    let outcome = StandardRules::new()
        .evaluate_outcome(&board, Side::Dark)
        .unwrap();
    assert_eq!(outcome, Some(Outcome::Checkmate(Side::Light)));
}

#[test]
fn test_stalemate() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Dark, PieceKind::King, sq("a8"))
        .unwrap()
        .with(Side::Light, PieceKind::Queen, sq("b6"))
        .unwrap()
        .with(Side::Light, PieceKind::King, sq("h1"))
        .unwrap();

    let rules = StandardRules::new();
    assert!(!rules.is_in_check(&board, Side::Dark));
    assert_eq!(
        rules.evaluate_outcome(&board, Side::Dark).unwrap(),
        Some(Outcome::Stalemate)
    );
    assert_eq!(rules.evaluate_outcome(&board, Side::Light).unwrap(), None);
}

#[test]
fn test_bare_kings_draw() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Dark, PieceKind::King, sq("a8"))
        .unwrap()
        .with(Side::Light, PieceKind::King, sq("h1"))
        .unwrap();

    assert_eq!(
        StandardRules::new()
            .evaluate_outcome(&board, Side::Light)
            .unwrap(),
        Some(Outcome::Draw)
    );
}

#[test]
fn test_opening_is_not_over() {
    let board = BoardState::standard();
    assert_eq!(
        StandardRules::new()
            .evaluate_outcome(&board, Side::Light)
            .unwrap(),
        None
    );
}

#[test]
fn test_outcome_display_and_winner() {
    assert_eq!(Outcome::Checkmate(Side::Dark).to_string(), "Checkmate, Dark wins");
    assert_eq!(Outcome::Checkmate(Side::Dark).winner(), Some(Side::Dark));
    assert!(Outcome::Stalemate.is_draw());
    assert!(Outcome::Draw.is_draw());
}
