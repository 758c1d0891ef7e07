//! Notification stream from the core to whatever displays the game.

use crate::controller::{RunMode, StopReason};
use crate::session::AppliedMove;
use duelboard_rules::{Outcome, Square};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::trace;

/// Messages sent from the core to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum GameEvent {
    /// A move was committed to the session.
    MoveApplied(AppliedMove),
    /// The interactive selection changed; `selected` is `None` when cleared.
    SelectionChanged {
        /// Selected square, if any.
        selected: Option<Square>,
        /// Legal destinations of the selected piece.
        destinations: Vec<Square>,
    },
    /// The engine runner changed mode.
    RunModeChanged(RunMode),
    /// The game reached an outcome.
    GameOver(Outcome),
    /// An automated move failed; the run (if any) has halted.
    EngineFailure(String),
    /// A continuous run ended.
    RunFinished(StopReason),
}

/// Receiving half of the notification stream.
pub type GameEvents = mpsc::UnboundedReceiver<GameEvent>;

/// Sending half of the notification stream, shared by every producer.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl EventSink {
    /// Creates a connected sink and receiver.
    pub fn channel() -> (Self, GameEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Sends an event. A missing observer is not an error for the game.
    pub fn emit(&self, event: GameEvent) {
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            trace!(?event, "No observer for game event");
        }
    }
}
