//! Interactive selection and move entry.
//!
//! [`InteractionMachine::activate`] turns a stream of square activations
//! into at most one applied move per turn. Each activation holds the session
//! lock for its whole decision, so an automated move is either fully visible
//! to it or not at all.

use crate::config::Seating;
use crate::controller::RunMode;
use crate::events::{EventSink, GameEvent};
use crate::session::{AppliedMove, SessionError, SharedSession};
use derive_getters::Getters;
use duelboard_rules::{Move, MoveOracle, Outcome, Piece, Square};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Why an activation changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RejectReason {
    /// The side to move is not interactive, or the square holds an enemy piece.
    #[display("not your turn")]
    NotYourTurn,
    /// An automated computation owns the session.
    #[display("engine is running")]
    EngineRunning,
    /// Nothing stands on the square and nothing is selected.
    #[display("empty square")]
    EmptySquare,
    /// The square lies off the board.
    #[display("square is off the board")]
    OffBoard,
    /// The oracle no longer allows the selected move.
    #[display("{} is not a legal move", _0)]
    IllegalMove(Move),
    /// The move oracle failed.
    #[display("move oracle failure: {}", _0)]
    OracleFailure(String),
}

/// Result of one square activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionResult {
    /// A piece was selected; these are its legal destinations.
    Highlighted(BTreeSet<Square>),
    /// The selected piece moved.
    MoveApplied(AppliedMove),
    /// The selection was cleared.
    Deselected,
    /// Nothing changed.
    Rejected(RejectReason),
    /// The game is over; nothing changed.
    GameOver(Outcome),
}

/// The piece chosen by the interactive side and where it may go.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Selection {
    /// Selected piece.
    piece: Piece,
    /// Legal destinations computed when the piece was selected.
    destinations: BTreeSet<Square>,
    /// Session ply at which the selection was made.
    ply: u32,
}

/// Whether a piece is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum InteractionState {
    /// No selection.
    Idle,
    /// A friendly piece is selected.
    PieceSelected,
}

/// Owns the selection and applies interactive moves to the shared session.
#[derive(derive_new::new)]
pub struct InteractionMachine {
    session: SharedSession,
    oracle: Arc<dyn MoveOracle>,
    run_mode: watch::Receiver<RunMode>,
    seating: Seating,
    events: EventSink,
    #[new(default)]
    selection: Option<Selection>,
}

impl std::fmt::Debug for InteractionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionMachine")
            .field("seating", &self.seating)
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}

impl InteractionMachine {
    /// Returns the current selection.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Returns whether a piece is selected.
    pub fn state(&self) -> InteractionState {
        match self.selection {
            Some(_) => InteractionState::PieceSelected,
            None => InteractionState::Idle,
        }
    }

    /// Returns which sides accept activations.
    pub fn seating(&self) -> Seating {
        self.seating
    }

    /// Drops the selection, notifying observers if there was one.
    ///
    /// Returns true if a selection was cleared.
    pub fn clear_selection(&mut self) -> bool {
        if self.selection.take().is_some() {
            self.events.emit(GameEvent::SelectionChanged {
                selected: None,
                destinations: Vec::new(),
            });
            true
        } else {
            false
        }
    }

    /// Handles one activation of `square`.
    #[instrument(skip(self, square), fields(square = %square))]
    pub fn activate(&mut self, square: Square) -> InteractionResult {
        let shared = self.session.clone();
        let mut session = shared.lock();

        if let Some(outcome) = session.outcome() {
            self.clear_selection();
            debug!(%outcome, "Activation after game over");
            return InteractionResult::GameOver(outcome);
        }

        let mode = *self.run_mode.borrow();
        if mode != RunMode::Idle {
            self.clear_selection();
            debug!(%mode, "Activation while engine is running");
            return InteractionResult::Rejected(RejectReason::EngineRunning);
        }

        if self
            .selection
            .as_ref()
            .is_some_and(|s| s.ply != session.ply())
        {
            debug!("Dropping selection from an earlier turn");
            self.clear_selection();
        }

        if let Some(selection) = &self.selection
            && session.board().piece_at(selection.piece.square) != Some(&selection.piece)
        {
            panic!(
                "Selection references {} on {} which is no longer on the board",
                selection.piece.kind, selection.piece.square
            );
        }

        let to_move = session.to_move();
        if !self.seating.is_interactive(to_move) {
            return InteractionResult::Rejected(RejectReason::NotYourTurn);
        }
        if !session.board().contains(square) {
            return InteractionResult::Rejected(RejectReason::OffBoard);
        }

        if let Some(selection) = self
            .selection
            .take_if(|s| s.destinations.contains(&square))
        {
            let from = selection.piece.square;
            self.events.emit(GameEvent::SelectionChanged {
                selected: None,
                destinations: Vec::new(),
            });
            return match session.apply_move(from, square, self.oracle.as_ref()) {
                Ok(applied) => {
                    info!(%applied, "Interactive move applied");
                    self.events.emit(GameEvent::MoveApplied(applied.clone()));
                    if let Some(outcome) = applied.outcome {
                        self.events.emit(GameEvent::GameOver(outcome));
                    }
                    InteractionResult::MoveApplied(applied)
                }
                Err(SessionError::Oracle(err)) => {
                    warn!(error = %err, "Move oracle failed while applying move");
                    InteractionResult::Rejected(RejectReason::OracleFailure(err.to_string()))
                }
                Err(SessionError::IllegalMove(mv)) => {
                    warn!(%mv, "Oracle no longer allows the selected move");
                    InteractionResult::Rejected(RejectReason::IllegalMove(mv))
                }
                Err(SessionError::GameOver(outcome)) => InteractionResult::GameOver(outcome),
                Err(err) => panic!("Selection out of sync with session: {err}"),
            };
        }

        let own_piece = session
            .board()
            .piece_at(square)
            .copied()
            .filter(|p| p.side == to_move);
        if let Some(piece) = own_piece {
            let destinations = match self.oracle.legal_destinations(&piece, session.board()) {
                Ok(destinations) => destinations,
                Err(err) => {
                    warn!(error = %err, "Move oracle failed while selecting");
                    self.clear_selection();
                    return InteractionResult::Rejected(RejectReason::OracleFailure(
                        err.to_string(),
                    ));
                }
            };
            debug!(piece = %piece.kind, count = destinations.len(), "Piece selected");
            self.events.emit(GameEvent::SelectionChanged {
                selected: Some(square),
                destinations: destinations.iter().copied().collect(),
            });
            self.selection = Some(Selection {
                piece,
                destinations: destinations.clone(),
                ply: session.ply(),
            });
            return InteractionResult::Highlighted(destinations);
        }

        if self.clear_selection() {
            return InteractionResult::Deselected;
        }

        match session.board().piece_at(square) {
            Some(_) => InteractionResult::Rejected(RejectReason::NotYourTurn),
            None => InteractionResult::Rejected(RejectReason::EmptySquare),
        }
    }
}
