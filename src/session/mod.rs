//! Game session: the single owner of board, turn and outcome.
//!
//! [`GameSession::apply_move`] is the only place the board and the side to
//! move change. It validates the move against the [`MoveOracle`], computes
//! the next position and its outcome on a copy, and commits all three at
//! once, so a failing collaborator never leaves a half-applied move behind.
//!
//! [`SharedSession`] is the lock both the interactive path and the engine
//! runner go through.

mod invariants;

pub use invariants::{
    AlternatingTurnInvariant, BoardConsistentInvariant, Invariant, InvariantSet,
    InvariantViolation, SessionInvariants, TerminalOutcomeInvariant,
};

use duelboard_rules::{
    BoardError, BoardState, Move, MoveOracle, OracleError, Outcome, PieceKind, Side, Square,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Record of one accepted half-move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMove {
    /// Side that moved.
    pub mover: Side,
    /// Kind of the moving piece before promotion.
    pub kind: PieceKind,
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Kind of the captured piece, if any.
    pub captured: Option<PieceKind>,
    /// Side to move after this move.
    pub new_turn: Side,
    /// Zero-based index of this move in the game.
    pub ply: u32,
    /// Outcome reached by this move, if it ended the game.
    pub outcome: Option<Outcome>,
}

impl std::fmt::Display for AppliedMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let separator = if self.captured.is_some() { 'x' } else { '-' };
        write!(f, "{} {}{}{}", self.mover, self.from, separator, self.to)
    }
}

/// Errors raised by [`GameSession`] mutations.
#[derive(Debug, Clone, derive_more::Display)]
pub enum SessionError {
    /// The game already has an outcome.
    #[display("Game is already over: {}", _0)]
    GameOver(Outcome),

    /// No piece stands on the origin square.
    #[display("No piece on {}", _0)]
    NoPiece(Square),

    /// The piece on the origin square belongs to the side not on move.
    #[display("{} cannot move on {}'s turn", mover, to_move)]
    WrongSide {
        /// Owner of the piece.
        mover: Side,
        /// Side whose turn it is.
        to_move: Side,
    },

    /// The oracle does not allow the move.
    #[display("{} is not a legal move", _0)]
    IllegalMove(Move),

    /// The board refused the transfer.
    #[display("{}", _0)]
    Board(BoardError),

    /// The move oracle failed.
    #[display("{}", _0)]
    Oracle(OracleError),
}

impl std::error::Error for SessionError {}

impl From<OracleError> for SessionError {
    fn from(err: OracleError) -> Self {
        Self::Oracle(err)
    }
}

impl From<BoardError> for SessionError {
    fn from(err: BoardError) -> Self {
        Self::Board(err)
    }
}

/// Board state, turn, outcome and history of one game.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: BoardState,
    to_move: Side,
    outcome: Option<Outcome>,
    history: Vec<AppliedMove>,
    max_plies: Option<u32>,
}

impl GameSession {
    /// Creates a session with `first` to move and no outcome.
    #[instrument(skip(board), fields(size = board.size()))]
    pub fn new(board: BoardState, first: Side) -> Self {
        debug!("Creating game session");
        Self {
            board,
            to_move: first,
            outcome: None,
            history: Vec::new(),
            max_plies: None,
        }
    }

    /// Creates a session and asks the oracle whether the starting position is already over.
    #[instrument(skip(board, oracle), fields(size = board.size()))]
    pub fn open(
        board: BoardState,
        first: Side,
        oracle: &dyn MoveOracle,
    ) -> Result<Self, OracleError> {
        let mut session = Self::new(board, first);
        session.outcome = oracle.evaluate_outcome(&session.board, first)?;
        if let Some(outcome) = session.outcome {
            info!(%outcome, "Starting position is already decided");
        }
        Ok(session)
    }

    /// Ends the game in a draw once this many half-moves have been played.
    pub fn with_max_plies(mut self, max_plies: Option<u32>) -> Self {
        self.max_plies = max_plies;
        self
    }

    /// Returns the board.
    pub fn board(&self) -> &BoardState {
        &self.board
    }

    /// Returns the side to move.
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Returns the outcome, once the game has ended.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Returns true once an outcome is set.
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Returns the accepted moves in order.
    pub fn history(&self) -> &[AppliedMove] {
        &self.history
    }

    /// Number of half-moves applied so far.
    pub fn ply(&self) -> u32 {
        self.history.len() as u32
    }

    /// Returns the ply limit, if any.
    pub fn max_plies(&self) -> Option<u32> {
        self.max_plies
    }

    /// Moves the piece on `from` to `to` for the side to move.
    ///
    /// On success the turn has flipped and the outcome of the new position
    /// is recorded. On error nothing has changed.
    #[instrument(skip(self, oracle, from, to), fields(from = %from, to = %to, side = %self.to_move))]
    pub fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        oracle: &dyn MoveOracle,
    ) -> Result<AppliedMove, SessionError> {
        if let Some(outcome) = self.outcome {
            warn!(%outcome, "Move attempted after game over");
            return Err(SessionError::GameOver(outcome));
        }

        let piece = *self.board.piece_at(from).ok_or(SessionError::NoPiece(from))?;
        if piece.side != self.to_move {
            return Err(SessionError::WrongSide {
                mover: piece.side,
                to_move: self.to_move,
            });
        }

        let mv = Move::new(from, to);
        if !oracle.legal_destinations(&piece, &self.board)?.contains(&to) {
            return Err(SessionError::IllegalMove(mv));
        }

        let mut next = self.board.clone();
        let captured = next.apply_move(mv)?;
        let new_turn = self.to_move.opponent();
        let ply = self.ply();

        let mut outcome = oracle.evaluate_outcome(&next, new_turn)?;
        if outcome.is_none() && self.max_plies.is_some_and(|limit| ply + 1 >= limit) {
            debug!(ply, "Ply limit reached");
            outcome = Some(Outcome::Draw);
        }

        let applied = AppliedMove {
            mover: piece.side,
            kind: piece.kind,
            from,
            to,
            captured: captured.map(|p| p.kind),
            new_turn,
            ply,
            outcome,
        };

        self.board = next;
        self.to_move = new_turn;
        self.outcome = outcome;
        self.history.push(applied.clone());

        #[cfg(debug_assertions)]
        if let Err(violations) = SessionInvariants::check_all(self) {
            panic!("Session invariants violated after {mv}: {violations:?}");
        }

        info!(ply, outcome = ?outcome, "Move applied");
        Ok(applied)
    }

    /// Marks the game finished because the side to move cannot play.
    ///
    /// Uses the oracle's verdict, falling back to [`Outcome::Stalemate`]
    /// when the oracle sees no end. Returns the existing outcome if one is
    /// already set.
    #[instrument(skip(self, oracle), fields(side = %self.to_move))]
    pub fn conclude(&mut self, oracle: &dyn MoveOracle) -> Result<Outcome, SessionError> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }
        let outcome = oracle
            .evaluate_outcome(&self.board, self.to_move)?
            .unwrap_or(Outcome::Stalemate);
        info!(%outcome, "Game concluded without a move");
        self.outcome = Some(outcome);
        Ok(outcome)
    }
}

/// A [`GameSession`] behind a mutex, shared by every execution context.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<GameSession>>,
}

impl SharedSession {
    /// Wraps a session for shared use.
    pub fn new(session: GameSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Acquires exclusive access to the session.
    ///
    /// Mutations commit all-or-nothing, so a lock poisoned by a panicking
    /// holder still guards a valid session and is recovered.
    pub fn lock(&self) -> MutexGuard<'_, GameSession> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("Recovering game session lock after a panic");
            poisoned.into_inner()
        })
    }

    /// Returns a copy of the current session.
    pub fn snapshot(&self) -> GameSession {
        self.lock().clone()
    }
}
