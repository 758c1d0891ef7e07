//! Tests for shell configuration loading and validation.

use duelboard::{DepthSettings, Layout, Opponent, SearchDepths, ShellConfig};
use duelboard_rules::{PieceKind, Side};
use std::io::Write;

#[test]
fn test_defaults() {
    let config = ShellConfig::default();
    assert_eq!(*config.board_size(), 8);
    assert_eq!(*config.layout(), Layout::Standard);
    assert_eq!(*config.human_side(), Side::Light);
    assert_eq!(*config.opponent(), Opponent::Engine);
    assert_eq!(*config.depths(), DepthSettings::new(2, 2));
    assert_eq!(config.ply_limit(), Some(400));
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = ShellConfig::from_toml_str("").unwrap();
    assert_eq!(config, ShellConfig::default());
}

#[test]
fn test_partial_toml() {
    let config = ShellConfig::from_toml_str(
        r#"
        human_side = "dark"
        opponent = "human"
        max_plies = 0

        [depths]
        opponent = 4
        "#,
    )
    .unwrap();

    assert_eq!(*config.human_side(), Side::Dark);
    assert_eq!(*config.opponent(), Opponent::Human);
    assert_eq!(config.depths().player, 2);
    assert_eq!(config.depths().opponent, 4);
    assert_eq!(config.ply_limit(), None);
}

#[test]
fn test_search_depths_follow_human_side() {
    let light = ShellConfig::default().with_depths(DepthSettings::new(1, 5));
    assert_eq!(light.search_depths(), SearchDepths::new(1, 5));

    let dark = light.with_human_side(Side::Dark);
    assert_eq!(dark.search_depths(), SearchDepths::new(5, 1));
}

#[test]
fn test_depth_settings_clamp() {
    assert_eq!(DepthSettings::new(0, 9), DepthSettings::new(1, 5));
}

#[test]
fn test_out_of_range_depth_in_file_is_rejected() {
    let err = ShellConfig::from_toml_str("[depths]\nplayer = 7\n").unwrap_err();
    assert!(err.message.contains("depths.player"));
}

#[test]
fn test_board_size_bounds() {
    assert!(ShellConfig::from_toml_str("board_size = 0\nlayout = \"pawn_race\"").is_err());
    assert!(ShellConfig::from_toml_str("board_size = 27\nlayout = \"pawn_race\"").is_err());
    assert!(ShellConfig::from_toml_str("board_size = 26\nlayout = \"pawn_race\"").is_ok());
}

#[test]
fn test_standard_layout_needs_eight() {
    let err = ShellConfig::from_toml_str("board_size = 6").unwrap_err();
    assert!(err.message.contains("standard layout"));
}

#[test]
fn test_pawn_race_board() {
    let config = ShellConfig::from_toml_str("board_size = 6\nlayout = \"pawn_race\"").unwrap();
    let board = config.build_board().unwrap();

    assert_eq!(board.size(), 6);
    assert_eq!(board.pieces_of(Side::Light).count(), 7);
    assert_eq!(
        board
            .pieces_of(Side::Dark)
            .filter(|p| p.kind == PieceKind::Pawn)
            .count(),
        6
    );
    assert!(board.king_of(Side::Dark).is_some());
}

#[test]
fn test_pawn_race_too_small() {
    assert!(ShellConfig::from_toml_str("board_size = 3\nlayout = \"pawn_race\"").is_err());
}

#[test]
fn test_malformed_toml_is_error() {
    let err = ShellConfig::from_toml_str("board_size = \"big\"").unwrap_err();
    assert!(err.message.contains("Failed to parse"));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "opponent = \"human\"\n[depths]\nplayer = 3").unwrap();

    let config = ShellConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.opponent(), Opponent::Human);
    assert_eq!(config.depths().player, 3);
    assert!(config.seating().is_interactive(Side::Dark));
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ShellConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("Failed to read"));
}

#[test]
fn test_seating_against_engine() {
    let seating = ShellConfig::default().seating();
    assert!(seating.is_interactive(Side::Light));
    assert!(seating.engine_plays(Side::Dark));
}
