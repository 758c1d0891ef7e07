//! Moves as first-class values.

use super::square::Square;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A piece transfer from one square to another.
///
/// A move carries no side; the mover is whoever stands on `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Move {
    /// Square the piece leaves.
    pub from: Square,
    /// Square the piece lands on.
    pub to: Square,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}
