//! Engine runner: single automated moves and continuous engine-vs-engine play.
//!
//! The run mode lives in a `watch` channel. Leaving [`RunMode::Idle`] is a
//! compare-and-set, so at most one automated computation owns the session
//! at a time and a second start is a no-op. A continuous run is a spawned
//! task; each search runs on the blocking pool against a snapshot of the
//! session and is committed under the session lock only if nothing moved
//! in the meantime.
//!
//! Stopping is cooperative. The loop reads the stop signal before it starts
//! each search; a search already under way finishes and its move is
//! applied, so at most one further move follows a [`AiRunController::stop`].

use crate::events::{EventSink, GameEvent};
use crate::session::{AppliedMove, SessionError, SharedSession};
use duelboard_rules::{MoveOracle, Outcome, SearchEngine, Side};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// What the engine runner is doing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Nothing automated is running.
    #[default]
    Idle,
    /// One automated move is being searched and applied.
    SingleAIMove,
    /// Engine-vs-engine play is running.
    ContinuousAI,
}

/// Why a continuous run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// [`AiRunController::stop`] was called.
    #[display("stop requested")]
    StopRequested,
    /// The game ended.
    #[display("game over ({})", _0)]
    GameOver(Outcome),
    /// A collaborator failed.
    #[display("engine failure ({})", _0)]
    EngineFailure(String),
}

/// Errors from automated moves.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ControllerError {
    /// The engine found nothing to play; the game has ended with this outcome.
    #[display("No legal move: {}", _0)]
    NoLegalMove(Outcome),

    /// The search engine failed or proposed an unplayable move.
    #[display("Search engine failure: {}", _0)]
    SearchEngineFailure(String),

    /// The move oracle failed while checking the engine's move.
    #[display("Move oracle failure: {}", _0)]
    OracleFailure(String),

    /// Another automated computation owns the session.
    #[display("Engine runner is busy ({})", _0)]
    Busy(RunMode),

    /// The game was already over.
    #[display("Game is already over: {}", _0)]
    GameOver(Outcome),

    /// The position changed while the engine was searching.
    #[display("Position changed during search")]
    Superseded,

    /// No Tokio runtime to run background work on.
    #[display("No Tokio runtime available")]
    NoRuntime,
}

impl std::error::Error for ControllerError {}

/// Search depth per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDepths {
    light: u8,
    dark: u8,
}

impl SearchDepths {
    /// Depths for the light and dark sides.
    pub fn new(light: u8, dark: u8) -> Self {
        Self { light, dark }
    }

    /// The same depth for both sides.
    pub fn uniform(depth: u8) -> Self {
        Self::new(depth, depth)
    }

    /// Depth used when searching for `side`.
    pub fn for_side(&self, side: Side) -> u8 {
        match side {
            Side::Light => self.light,
            Side::Dark => self.dark,
        }
    }
}

#[derive(Debug, Default)]
struct RunHandles {
    stop: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<StopReason>>,
}

struct Inner {
    session: SharedSession,
    oracle: Arc<dyn MoveOracle>,
    engine: Arc<dyn SearchEngine>,
    mode: watch::Sender<RunMode>,
    run: Mutex<RunHandles>,
    events: EventSink,
}

/// Owns the lifecycle of automated computations over a [`SharedSession`].
///
/// Cloning yields another handle to the same runner.
#[derive(Clone)]
pub struct AiRunController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AiRunController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiRunController")
            .field("mode", &self.run_mode())
            .finish_non_exhaustive()
    }
}

impl AiRunController {
    /// Creates an idle runner.
    pub fn new(
        session: SharedSession,
        oracle: Arc<dyn MoveOracle>,
        engine: Arc<dyn SearchEngine>,
        events: EventSink,
    ) -> Self {
        let (mode, _) = watch::channel(RunMode::Idle);
        Self {
            inner: Arc::new(Inner {
                session,
                oracle,
                engine,
                mode,
                run: Mutex::new(RunHandles::default()),
                events,
            }),
        }
    }

    /// Returns the current run mode.
    pub fn run_mode(&self) -> RunMode {
        *self.inner.mode.borrow()
    }

    /// Returns a receiver that observes run mode changes.
    pub fn subscribe(&self) -> watch::Receiver<RunMode> {
        self.inner.mode.subscribe()
    }

    /// Searches and applies one move for the side to move, then returns.
    ///
    /// Run mode is [`RunMode::SingleAIMove`] for the duration, and returns to
    /// idle even if the future is dropped early.
    #[instrument(skip(self))]
    pub async fn play_one_automated_move(&self, depth: u8) -> Result<AppliedMove, ControllerError> {
        let _claim = ModeClaim::acquire(&self.inner, RunMode::SingleAIMove)?;
        self.inner.half_move(SearchDepths::uniform(depth)).await
    }

    /// Claims [`RunMode::SingleAIMove`] now and plays one move on a spawned task.
    ///
    /// Interactive activations are rejected from the moment this returns
    /// until the spawned move is committed.
    #[instrument(skip(self))]
    pub fn spawn_automated_move(
        &self,
        depth: u8,
    ) -> Result<JoinHandle<Result<AppliedMove, ControllerError>>, ControllerError> {
        let handle = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;
        let claim = ModeClaim::acquire(&self.inner, RunMode::SingleAIMove)?;
        let inner = Arc::clone(&self.inner);
        Ok(handle.spawn(async move {
            let _claim = claim;
            inner.half_move(SearchDepths::uniform(depth)).await
        }))
    }

    /// Starts engine-vs-engine play on a background task.
    ///
    /// Returns `Ok(false)` without spawning anything if a continuous run is
    /// already active.
    #[instrument(skip(self))]
    pub fn start_continuous(&self, depths: SearchDepths) -> Result<bool, ControllerError> {
        let handle = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;
        let mut run = self.inner.lock_run();

        match self.inner.try_claim(RunMode::ContinuousAI) {
            Ok(()) => {}
            Err(RunMode::ContinuousAI) => {
                debug!("Continuous run already active");
                return Ok(false);
            }
            Err(busy) => {
                warn!(mode = %busy, "Cannot start continuous run");
                return Err(ControllerError::Busy(busy));
            }
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        run.stop = Some(stop_tx);
        run.task = Some(handle.spawn(continuous_loop(
            Arc::clone(&self.inner),
            depths,
            stop_rx,
        )));
        info!("Continuous run started");
        Ok(true)
    }

    /// Asks a continuous run to end. Returns without waiting for it.
    ///
    /// Returns true if a running loop was signalled.
    #[instrument(skip(self))]
    pub fn stop(&self) -> bool {
        let run = self.inner.lock_run();
        match &run.stop {
            Some(stop) if self.run_mode() == RunMode::ContinuousAI => {
                stop.send_replace(true);
                info!("Stop requested");
                true
            }
            _ => {
                debug!("No continuous run to stop");
                false
            }
        }
    }

    /// Waits for the most recently started continuous run to exit.
    ///
    /// Returns `None` if there is no run to wait for (or another caller is
    /// already waiting on it).
    pub async fn finished(&self) -> Option<StopReason> {
        let task = self.inner.lock_run().task.take()?;
        match task.await {
            Ok(reason) => Some(reason),
            Err(err) => {
                error!(error = %err, "Continuous run task died");
                Some(StopReason::EngineFailure(err.to_string()))
            }
        }
    }
}

impl Inner {
    fn lock_run(&self) -> MutexGuard<'_, RunHandles> {
        self.run.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves `Idle` to `target`, or reports the mode that blocked the claim.
    fn try_claim(&self, target: RunMode) -> Result<(), RunMode> {
        let mut blocking = RunMode::Idle;
        let claimed = self.mode.send_if_modified(|mode| {
            if *mode == RunMode::Idle {
                *mode = target;
                self.events.emit(GameEvent::RunModeChanged(target));
                true
            } else {
                blocking = *mode;
                false
            }
        });
        if claimed { Ok(()) } else { Err(blocking) }
    }

    fn release(&self) {
        self.mode.send_modify(|mode| {
            *mode = RunMode::Idle;
            self.events.emit(GameEvent::RunModeChanged(RunMode::Idle));
        });
    }

    fn fail(&self, err: ControllerError) -> ControllerError {
        error!(error = %err, "Automated move failed");
        self.events.emit(GameEvent::EngineFailure(err.to_string()));
        err
    }

    /// Searches for the side to move and commits the result.
    async fn half_move(&self, depths: SearchDepths) -> Result<AppliedMove, ControllerError> {
        let (board, side, ply) = {
            let session = self.session.lock();
            if let Some(outcome) = session.outcome() {
                return Err(ControllerError::GameOver(outcome));
            }
            (session.board().clone(), session.to_move(), session.ply())
        };

        let depth = depths.for_side(side);
        let engine = Arc::clone(&self.engine);
        debug!(%side, depth, ply, "Searching");
        let searched =
            tokio::task::spawn_blocking(move || engine.choose_move(&board, side, depth)).await;
        let choice = match searched {
            Ok(Ok(choice)) => choice,
            Ok(Err(err)) => {
                return Err(self.fail(ControllerError::SearchEngineFailure(err.to_string())));
            }
            Err(err) => {
                return Err(self.fail(ControllerError::SearchEngineFailure(format!(
                    "search task died: {err}"
                ))));
            }
        };

        let mut session = self.session.lock();
        if let Some(outcome) = session.outcome() {
            return Err(ControllerError::GameOver(outcome));
        }
        if session.ply() != ply {
            debug!(searched_at = ply, now = session.ply(), "Discarding stale search");
            return Err(ControllerError::Superseded);
        }

        let Some(mv) = choice else {
            let outcome = session
                .conclude(self.oracle.as_ref())
                .map_err(|err| self.fail(ControllerError::OracleFailure(err.to_string())))?;
            info!(%side, %outcome, "Engine has no legal move");
            self.events.emit(GameEvent::GameOver(outcome));
            return Err(ControllerError::NoLegalMove(outcome));
        };

        match session.apply_move(mv.from, mv.to, self.oracle.as_ref()) {
            Ok(applied) => {
                info!(%applied, "Engine move applied");
                self.events.emit(GameEvent::MoveApplied(applied.clone()));
                if let Some(outcome) = applied.outcome {
                    self.events.emit(GameEvent::GameOver(outcome));
                }
                Ok(applied)
            }
            Err(SessionError::GameOver(outcome)) => Err(ControllerError::GameOver(outcome)),
            Err(SessionError::Oracle(err)) => {
                Err(self.fail(ControllerError::OracleFailure(err.to_string())))
            }
            Err(err) => Err(self.fail(ControllerError::SearchEngineFailure(format!(
                "engine proposed {mv}: {err}"
            )))),
        }
    }
}

/// Holds a non-idle run mode and returns to idle on drop.
struct ModeClaim {
    inner: Arc<Inner>,
}

impl ModeClaim {
    fn acquire(inner: &Arc<Inner>, target: RunMode) -> Result<Self, ControllerError> {
        inner.try_claim(target).map_err(ControllerError::Busy)?;
        Ok(Self {
            inner: Arc::clone(inner),
        })
    }
}

impl Drop for ModeClaim {
    fn drop(&mut self) {
        self.inner.release();
    }
}

async fn continuous_loop(
    inner: Arc<Inner>,
    depths: SearchDepths,
    stop: watch::Receiver<bool>,
) -> StopReason {
    let reason = loop {
        let stopping = *stop.borrow();
        if stopping {
            break StopReason::StopRequested;
        }

        match inner.half_move(depths).await {
            Ok(applied) => {
                if let Some(outcome) = applied.outcome {
                    break StopReason::GameOver(outcome);
                }
            }
            Err(ControllerError::NoLegalMove(outcome) | ControllerError::GameOver(outcome)) => {
                break StopReason::GameOver(outcome);
            }
            Err(ControllerError::Superseded) => {}
            Err(err) => break StopReason::EngineFailure(err.to_string()),
        }

        tokio::task::yield_now().await;
    };

    info!(%reason, "Continuous run finished");
    inner.events.emit(GameEvent::RunFinished(reason.clone()));
    inner.release();
    reason
}
