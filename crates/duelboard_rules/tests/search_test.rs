//! Tests for the material search engine.

use duelboard_rules::{BoardState, MaterialSearch, Move, PieceKind, SearchEngine, Side, Square};

fn sq(text: &str) -> Square {
    text.parse().expect("valid square")
}

#[test]
fn test_takes_hanging_queen() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Light, PieceKind::King, sq("a1"))
        .unwrap()
        .with(Side::Light, PieceKind::Rook, sq("d1"))
        .unwrap()
        .with(Side::Dark, PieceKind::Queen, sq("d5"))
        .unwrap()
        .with(Side::Dark, PieceKind::King, sq("h8"))
        .unwrap();

    let choice = MaterialSearch::new()
        .choose_move(&board, Side::Light, 1)
        .unwrap();
    assert_eq!(choice, Some(Move::new(sq("d1"), sq("d5"))));
}

#[test]
fn test_finds_mate_in_one() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Dark, PieceKind::King, sq("h8"))
        .unwrap()
        .with(Side::Dark, PieceKind::Pawn, sq("g7"))
        .unwrap()
        .with(Side::Dark, PieceKind::Pawn, sq("h7"))
        .unwrap()
        .with(Side::Light, PieceKind::Rook, sq("a1"))
        .unwrap()
        .with(Side::Light, PieceKind::King, sq("c3"))
        .unwrap();

    let choice = MaterialSearch::new()
        .choose_move(&board, Side::Light, 2)
        .unwrap();
    assert_eq!(choice, Some(Move::new(sq("a1"), sq("a8"))));
}

#[test]
fn test_no_move_when_stalemated() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Dark, PieceKind::King, sq("a8"))
        .unwrap()
        .with(Side::Light, PieceKind::Queen, sq("b6"))
        .unwrap()
        .with(Side::Light, PieceKind::King, sq("h1"))
        .unwrap();

    let choice = MaterialSearch::new()
        .choose_move(&board, Side::Dark, 3)
        .unwrap();
    assert_eq!(choice, None);
}

#[test]
fn test_depth_zero_still_moves() {
    let board = BoardState::standard();
    let choice = MaterialSearch::new()
        .choose_move(&board, Side::Light, 0)
        .unwrap();
    assert!(choice.is_some());
}

#[test]
fn test_search_is_deterministic() {
    let board = BoardState::standard();
    let engine = MaterialSearch::new();
    let first = engine.choose_move(&board, Side::Light, 2).unwrap();
    let second = engine.choose_move(&board, Side::Light, 2).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_evaluate_counts_material() {
    let board = BoardState::empty(8)
        .unwrap()
        .with(Side::Light, PieceKind::Rook, sq("a1"))
        .unwrap()
        .with(Side::Dark, PieceKind::Knight, sq("h8"))
        .unwrap();

    assert_eq!(MaterialSearch::evaluate(&board, Side::Light), 180);
    assert_eq!(MaterialSearch::evaluate(&board, Side::Dark), -180);
}
