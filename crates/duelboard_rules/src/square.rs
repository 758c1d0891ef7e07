//! Board coordinates.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Board dimension of a standard chess board.
pub const STANDARD_BOARD_SIZE: u8 = 8;

/// Largest supported board dimension (files are lettered `a`..=`z`).
pub const MAX_BOARD_SIZE: u8 = 26;

/// A square addressed by file (column) and rank (row), both zero-based.
///
/// A square carries no board dimension of its own; whether it lies on a
/// given board is answered by [`Square::in_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    /// Zero-based file.
    pub file: u8,
    /// Zero-based rank.
    pub rank: u8,
}

impl Square {
    /// Creates a square from file and rank.
    pub const fn new(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// Returns the file.
    pub fn file(&self) -> u8 {
        self.file
    }

    /// Returns the rank.
    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Checks whether the square lies on a board of dimension `size`.
    pub fn in_bounds(&self, size: u8) -> bool {
        self.file < size && self.rank < size
    }

    /// Returns the square shifted by `(files, ranks)` if it stays on a board of dimension `size`.
    pub fn offset(&self, files: i8, ranks: i8, size: u8) -> Option<Square> {
        let file = i16::from(self.file) + i16::from(files);
        let rank = i16::from(self.rank) + i16::from(ranks);
        let size = i16::from(size);
        if (0..size).contains(&file) && (0..size).contains(&rank) {
            Some(Square::new(file as u8, rank as u8))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.file < MAX_BOARD_SIZE {
            write!(f, "{}{}", char::from(b'a' + self.file), u16::from(self.rank) + 1)
        } else {
            write!(f, "({},{})", self.file, self.rank)
        }
    }
}

/// Error returned when text cannot be read as a square.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Cannot read {:?} as a square (expected e.g. \"b3\" or \"1,2\")", input)]
pub struct SquareParseError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Square {
    type Err = SquareParseError;

    /// Reads algebraic text (`"b3"`) or a zero-based pair (`"1,2"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let fail = || SquareParseError {
            input: s.to_string(),
        };

        if let Some((file, rank)) = text.split_once(',') {
            let file = file.trim().parse::<u8>().map_err(|_| fail())?;
            let rank = rank.trim().parse::<u8>().map_err(|_| fail())?;
            return Ok(Square::new(file, rank));
        }

        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(fail)?.to_ascii_lowercase();
        if !letter.is_ascii_lowercase() {
            return Err(fail());
        }
        let rank = chars.as_str().parse::<u8>().map_err(|_| fail())?;
        if rank == 0 {
            return Err(fail());
        }
        Ok(Square::new(letter as u8 - b'a', rank - 1))
    }
}
