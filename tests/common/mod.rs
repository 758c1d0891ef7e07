//! Scripted collaborators and helpers shared by the integration tests.

#![allow(dead_code)]

use duelboard::{EventSink, GameEvent, GameEvents, GameSession, SharedSession};
use duelboard_rules::{
    BoardState, Move, MoveOracle, OracleError, Outcome, Piece, PieceKind, SearchEngine,
    SearchError, Side, Square,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use tokio::sync::mpsc as async_mpsc;

type OutcomeRule = Box<dyn Fn(&BoardState, Side) -> Option<Outcome> + Send + Sync>;

/// Oracle with per-square destination lists and a pluggable outcome rule.
pub struct ScriptedOracle {
    destinations: BTreeMap<Square, BTreeSet<Square>>,
    outcome: OutcomeRule,
    failing: bool,
    withdrawn: Arc<AtomicBool>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            destinations: BTreeMap::new(),
            outcome: Box::new(|_, _| None),
            failing: false,
            withdrawn: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The piece standing on `from` may move to each of `to`.
    pub fn with_destinations(mut self, from: Square, to: &[Square]) -> Self {
        self.destinations
            .entry(from)
            .or_default()
            .extend(to.iter().copied());
        self
    }

    pub fn with_outcome(
        mut self,
        rule: impl Fn(&BoardState, Side) -> Option<Outcome> + Send + Sync + 'static,
    ) -> Self {
        self.outcome = Box::new(rule);
        self
    }

    /// Flag that, once set, leaves every piece without destinations.
    pub fn withdrawal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.withdrawn)
    }

    /// Every call fails.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl MoveOracle for ScriptedOracle {
    fn legal_destinations(
        &self,
        piece: &Piece,
        _board: &BoardState,
    ) -> Result<BTreeSet<Square>, OracleError> {
        if self.failing {
            return Err(OracleError::new("scripted oracle failure"));
        }
        if self.withdrawn.load(Ordering::SeqCst) {
            return Ok(BTreeSet::new());
        }
        Ok(self
            .destinations
            .get(&piece.square)
            .cloned()
            .unwrap_or_default())
    }

    fn evaluate_outcome(
        &self,
        board: &BoardState,
        side_to_move: Side,
    ) -> Result<Option<Outcome>, OracleError> {
        if self.failing {
            return Err(OracleError::new("scripted oracle failure"));
        }
        Ok((self.outcome)(board, side_to_move))
    }
}

/// One scripted engine reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Play(Move),
    Nothing,
    Fail(String),
}

/// Engine that answers from a queue, optionally waiting for a release first.
///
/// An exhausted queue answers `None`.
pub struct ScriptedEngine {
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
    depths: Mutex<Vec<(Side, u8)>>,
    gate: Option<Gate>,
}

struct Gate {
    started: async_mpsc::UnboundedSender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

/// Test-side handles of a gated engine.
pub struct GateControl {
    pub started: async_mpsc::UnboundedReceiver<()>,
    pub release: mpsc::Sender<()>,
}

impl ScriptedEngine {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: AtomicUsize::new(0),
            depths: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Each search reports that it started, then blocks until released.
    pub fn gated(replies: impl IntoIterator<Item = Reply>) -> (Self, GateControl) {
        let (started_tx, started_rx) = async_mpsc::unbounded_channel();
        let (release_tx, release_rx) = mpsc::channel();
        let mut engine = Self::new(replies);
        engine.gate = Some(Gate {
            started: started_tx,
            release: Mutex::new(release_rx),
        });
        (
            engine,
            GateControl {
                started: started_rx,
                release: release_tx,
            },
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn depths(&self) -> Vec<(Side, u8)> {
        self.depths.lock().unwrap().clone()
    }
}

impl SearchEngine for ScriptedEngine {
    fn choose_move(
        &self,
        _board: &BoardState,
        side_to_move: Side,
        depth: u8,
    ) -> Result<Option<Move>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.depths.lock().unwrap().push((side_to_move, depth));
        if let Some(gate) = &self.gate {
            let _ = gate.started.send(());
            let _ = gate.release.lock().unwrap().recv();
        }
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Play(mv)) => Ok(Some(mv)),
            Some(Reply::Fail(message)) => Err(SearchError::new(message)),
            Some(Reply::Nothing) | None => Ok(None),
        }
    }
}

pub fn sq(file: u8, rank: u8) -> Square {
    Square::new(file, rank)
}

pub fn mv(from: Square, to: Square) -> Move {
    Move::new(from, to)
}

/// 8x8 board holding the given pieces.
pub fn board_with(pieces: &[(Side, PieceKind, Square)]) -> BoardState {
    pieces
        .iter()
        .try_fold(BoardState::empty(8).unwrap(), |board, &(side, kind, square)| {
            board.with(side, kind, square)
        })
        .unwrap()
}

pub fn shared(board: BoardState, first: Side) -> SharedSession {
    SharedSession::new(GameSession::new(board, first))
}

pub fn sink() -> (EventSink, GameEvents) {
    EventSink::channel()
}

/// Takes every event already sent.
pub fn drain(events: &mut GameEvents) -> Vec<GameEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

pub fn moves_applied(events: &[GameEvent]) -> Vec<duelboard::AppliedMove> {
    events
        .iter()
        .filter_map(|event| match event {
            GameEvent::MoveApplied(applied) => Some(applied.clone()),
            _ => None,
        })
        .collect()
}
