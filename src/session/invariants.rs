//! First-class session invariants.
//!
//! These are properties every committed [`GameSession`] must satisfy. They
//! are checked after each mutation in debug builds and can be tested
//! independently.

use super::GameSession;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<InvariantViolation> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: sides alternate through the history and the turn follows the last move.
pub struct AlternatingTurnInvariant;

impl Invariant<GameSession> for AlternatingTurnInvariant {
    fn holds(session: &GameSession) -> bool {
        let history = &session.history;

        let flips = history.iter().all(|m| m.new_turn == m.mover.opponent());
        let alternates = history.windows(2).all(|w| w[0].mover != w[1].mover);
        let turn_matches = history
            .last()
            .is_none_or(|last| last.new_turn == session.to_move);

        flips && alternates && turn_matches
    }

    fn description() -> &'static str {
        "Sides alternate and the side to move follows the last applied move"
    }
}

/// Invariant: every piece is stored under its own square, on the board.
pub struct BoardConsistentInvariant;

impl Invariant<GameSession> for BoardConsistentInvariant {
    fn holds(session: &GameSession) -> bool {
        session.board.is_consistent()
    }

    fn description() -> &'static str {
        "Every piece's square matches its board key"
    }
}

/// Invariant: an outcome is only ever recorded on the final move.
pub struct TerminalOutcomeInvariant;

impl Invariant<GameSession> for TerminalOutcomeInvariant {
    fn holds(session: &GameSession) -> bool {
        let Some((last, earlier)) = session.history.split_last() else {
            return true;
        };
        let none_before = earlier.iter().all(|m| m.outcome.is_none());
        let last_agrees = last.outcome.is_none() || last.outcome == session.outcome;

        none_before && last_agrees
    }

    fn description() -> &'static str {
        "No move is applied after an outcome is recorded"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (
    AlternatingTurnInvariant,
    BoardConsistentInvariant,
    TerminalOutcomeInvariant,
);
