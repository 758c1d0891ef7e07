//! Command-line interface for duelboard.

use clap::{Parser, Subcommand, ValueEnum};
use duelboard::Opponent;
use duelboard_rules::Side;

/// Duelboard - play a board game against a human or the engine
#[derive(Parser, Debug)]
#[command(name = "duelboard")]
#[command(about = "Two-player board game shell with a cancellable engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play interactively in the terminal
    Play {
        /// Side the human plays
        #[arg(long, value_enum)]
        human_side: Option<SideArg>,

        /// Who plays the other side
        #[arg(long, value_enum)]
        opponent: Option<Opponent>,

        /// Search depth for both sides (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        depth: Option<u8>,
    },

    /// Watch the engine play itself until the game ends or Ctrl-C
    Watch {
        /// Search depth for both sides (1-5)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        depth: Option<u8>,

        /// Half-moves before the game is drawn (0 for no limit)
        #[arg(long)]
        max_plies: Option<u32>,

        /// Print every event as one JSON line
        #[arg(long)]
        json: bool,
    },
}

/// Side selection on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideArg {
    /// Light (moves first)
    Light,
    /// Dark
    Dark,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Light => Side::Light,
            SideArg::Dark => Side::Dark,
        }
    }
}
