//! Material-counting negamax search.

use super::action::Move;
use super::board::BoardState;
use super::oracle::{SearchEngine, SearchError};
use super::rules::StandardRules;
use super::types::Side;
use tracing::{debug, instrument};

/// Score of a position where the side to move is mated, before ply adjustment.
pub const MATE_SCORE: i32 = 100_000;

/// Depth-limited alpha-beta search over [`StandardRules`] with a material evaluation.
///
/// Move order is deterministic (captures of the most valuable victim first,
/// then square order), so equal positions always produce the same choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialSearch {
    rules: StandardRules,
}

impl MaterialSearch {
    /// Creates a search using the standard rules.
    pub fn new() -> Self {
        Self {
            rules: StandardRules::new(),
        }
    }

    /// Material balance from `side`'s point of view.
    pub fn evaluate(board: &BoardState, side: Side) -> i32 {
        board
            .pieces()
            .map(|p| {
                if p.side == side {
                    p.kind.value()
                } else {
                    -p.kind.value()
                }
            })
            .sum()
    }

    fn ordered_moves(&self, board: &BoardState, side: Side) -> Vec<Move> {
        let mut moves = self.rules.legal_moves(board, side);
        // Stable sort keeps square order among equal victims.
        moves.sort_by_key(|mv| {
            std::cmp::Reverse(board.piece_at(mv.to).map_or(0, |victim| victim.kind.value() + 1))
        });
        moves
    }

    fn negamax(
        &self,
        board: &BoardState,
        side: Side,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        ply: i32,
    ) -> Result<i32, SearchError> {
        let moves = self.ordered_moves(board, side);
        if moves.is_empty() {
            return Ok(if self.rules.is_in_check(board, side) {
                -MATE_SCORE + ply
            } else {
                0
            });
        }
        if depth == 0 {
            return Ok(Self::evaluate(board, side));
        }

        let mut best = -MATE_SCORE - 1;
        for mv in moves {
            let mut next = board.clone();
            next.apply_move(mv)
                .map_err(|e| SearchError::new(format!("Generated move {} failed: {}", mv, e)))?;
            let score = -self.negamax(&next, side.opponent(), depth - 1, -beta, -alpha, ply + 1)?;
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        Ok(best)
    }
}

impl SearchEngine for MaterialSearch {
    #[instrument(skip(self, board))]
    fn choose_move(
        &self,
        board: &BoardState,
        side_to_move: Side,
        depth: u8,
    ) -> Result<Option<Move>, SearchError> {
        let depth = depth.max(1);
        let mut best: Option<(Move, i32)> = None;
        let mut alpha = -MATE_SCORE - 1;

        for mv in self.ordered_moves(board, side_to_move) {
            let mut next = board.clone();
            next.apply_move(mv)
                .map_err(|e| SearchError::new(format!("Generated move {} failed: {}", mv, e)))?;
            let score = -self.negamax(
                &next,
                side_to_move.opponent(),
                depth - 1,
                -MATE_SCORE - 1,
                -alpha,
                1,
            )?;
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
                alpha = alpha.max(score);
            }
        }

        if let Some((mv, score)) = best {
            debug!(%mv, score, "Search chose move");
        } else {
            debug!("No legal move to search");
        }
        Ok(best.map(|(mv, _)| mv))
    }
}
