//! Shell configuration: who plays which side, search depths, board setup.

use crate::controller::SearchDepths;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use duelboard_rules::{BoardState, MAX_BOARD_SIZE, STANDARD_BOARD_SIZE, Side};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Shallowest search depth accepted.
pub const MIN_DEPTH: u8 = 1;
/// Deepest search depth accepted.
pub const MAX_DEPTH: u8 = 5;
/// Search depth used when none is configured.
pub const DEFAULT_DEPTH: u8 = 2;

/// Who plays against the human.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Opponent {
    /// A second human at the same board; both sides are interactive.
    Human,
    /// The search engine answers every human move.
    #[default]
    Engine,
}

/// Starting position.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Standard chess opening (8x8 only).
    #[default]
    Standard,
    /// Kings and a full row of pawns per side (any size from 4).
    PawnRace,
}

/// Which sides accept interactive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seating {
    /// The side the human plays.
    pub human_side: Side,
    /// Who plays the other side.
    pub opponent: Opponent,
}

impl Seating {
    /// Returns true if square activations are accepted while `side` is to move.
    pub fn is_interactive(&self, side: Side) -> bool {
        self.opponent == Opponent::Human || side == self.human_side
    }

    /// Returns true if the engine answers for `side`.
    pub fn engine_plays(&self, side: Side) -> bool {
        !self.is_interactive(side)
    }
}

/// Search depths for the human's side (when automated) and the opponent's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthSettings {
    /// Depth used for the human's side.
    #[serde(default = "default_depth")]
    pub player: u8,
    /// Depth used for the opponent's side.
    #[serde(default = "default_depth")]
    pub opponent: u8,
}

impl DepthSettings {
    /// Creates depth settings, clamping both to the accepted range.
    pub fn new(player: u8, opponent: u8) -> Self {
        Self {
            player: player.clamp(MIN_DEPTH, MAX_DEPTH),
            opponent: opponent.clamp(MIN_DEPTH, MAX_DEPTH),
        }
    }
}

impl Default for DepthSettings {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH, DEFAULT_DEPTH)
    }
}

fn default_depth() -> u8 {
    DEFAULT_DEPTH
}

fn default_board_size() -> u8 {
    STANDARD_BOARD_SIZE
}

fn default_human_side() -> Side {
    Side::Light
}

fn default_max_plies() -> u32 {
    400
}

/// Configuration for a game table.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct ShellConfig {
    /// Board dimension.
    #[serde(default = "default_board_size")]
    board_size: u8,

    /// Starting position.
    #[serde(default)]
    layout: Layout,

    /// The side the human plays.
    #[serde(default = "default_human_side")]
    human_side: Side,

    /// Who plays the other side.
    #[serde(default)]
    opponent: Opponent,

    /// Search depths.
    #[serde(default)]
    depths: DepthSettings,

    /// Half-moves after which the game is drawn; 0 means no limit.
    #[serde(default = "default_max_plies")]
    max_plies: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            board_size: default_board_size(),
            layout: Layout::default(),
            human_side: default_human_side(),
            opponent: Opponent::default(),
            depths: DepthSettings::default(),
            max_plies: default_max_plies(),
        }
    }
}

impl ShellConfig {
    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(layout = %config.layout, opponent = %config.opponent, "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the settings describe a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_size == 0 || self.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::new(format!(
                "board_size must be within 1..={}, got {}",
                MAX_BOARD_SIZE, self.board_size
            )));
        }
        match self.layout {
            Layout::Standard if self.board_size != STANDARD_BOARD_SIZE => {
                return Err(ConfigError::new(format!(
                    "standard layout needs board_size {}, got {}",
                    STANDARD_BOARD_SIZE, self.board_size
                )));
            }
            Layout::PawnRace if self.board_size < 4 => {
                return Err(ConfigError::new(format!(
                    "pawn_race layout needs board_size of at least 4, got {}",
                    self.board_size
                )));
            }
            _ => {}
        }
        for (name, depth) in [("player", self.depths.player), ("opponent", self.depths.opponent)] {
            if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
                return Err(ConfigError::new(format!(
                    "depths.{} must be within {}..={}, got {}",
                    name, MIN_DEPTH, MAX_DEPTH, depth
                )));
            }
        }
        Ok(())
    }

    /// Builds the starting board.
    pub fn build_board(&self) -> Result<BoardState, ConfigError> {
        self.validate()?;
        match self.layout {
            Layout::Standard => Ok(BoardState::standard()),
            Layout::PawnRace => BoardState::pawn_race(self.board_size)
                .map_err(|e| ConfigError::new(format!("Failed to build board: {}", e))),
        }
    }

    /// Which sides are interactive.
    pub fn seating(&self) -> Seating {
        Seating {
            human_side: self.human_side,
            opponent: self.opponent,
        }
    }

    /// Per-side search depths derived from the human's side.
    pub fn search_depths(&self) -> SearchDepths {
        let DepthSettings { player, opponent } = self.depths;
        match self.human_side {
            Side::Light => SearchDepths::new(player, opponent),
            Side::Dark => SearchDepths::new(opponent, player),
        }
    }

    /// Ply limit, or `None` when unlimited.
    pub fn ply_limit(&self) -> Option<u32> {
        (self.max_plies > 0).then_some(self.max_plies)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
