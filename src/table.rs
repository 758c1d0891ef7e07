//! Composition root: one game, its interactive seat and its engine runner.

use crate::config::{ConfigError, Seating, ShellConfig};
use crate::controller::{AiRunController, ControllerError, RunMode, SearchDepths, StopReason};
use crate::events::{EventSink, GameEvents};
use crate::interaction::{InteractionMachine, InteractionResult};
use crate::session::{AppliedMove, GameSession, SharedSession};
use duelboard_rules::{BoardState, MoveOracle, OracleError, SearchEngine, Side, Square};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Errors raised while setting up a table.
#[derive(Debug, Clone, derive_more::Display, derive_more::From)]
pub enum TableError {
    /// The configuration is unusable.
    #[display("{}", _0)]
    Config(ConfigError),
    /// The oracle failed on the starting position.
    #[display("{}", _0)]
    Oracle(OracleError),
}

impl std::error::Error for TableError {}

/// What [`GameTable::toggle_automation`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Automation {
    /// A continuous run started.
    Started,
    /// The running loop was asked to stop.
    Stopping,
}

/// A game in progress with its interaction machine and engine runner.
///
/// With [`crate::Opponent::Engine`] the table answers every interactive
/// move with one automated move for the engine's side.
#[derive(Debug)]
pub struct GameTable {
    session: SharedSession,
    interaction: InteractionMachine,
    controller: AiRunController,
    depths: SearchDepths,
    pending: Option<JoinHandle<Result<AppliedMove, ControllerError>>>,
}

impl GameTable {
    /// Creates a table for `board` with `first` to move.
    #[instrument(skip(board, oracle, engine), fields(size = board.size()))]
    pub fn new(
        board: BoardState,
        first: Side,
        seating: Seating,
        depths: SearchDepths,
        max_plies: Option<u32>,
        oracle: Arc<dyn MoveOracle>,
        engine: Arc<dyn SearchEngine>,
    ) -> Result<(Self, GameEvents), OracleError> {
        let session = GameSession::open(board, first, oracle.as_ref())?.with_max_plies(max_plies);
        let session = SharedSession::new(session);
        let (events, rx) = EventSink::channel();
        let controller = AiRunController::new(
            session.clone(),
            Arc::clone(&oracle),
            engine,
            events.clone(),
        );
        let interaction =
            InteractionMachine::new(session.clone(), oracle, controller.subscribe(), seating, events);
        info!(human = %seating.human_side, opponent = %seating.opponent, "Table ready");
        Ok((
            Self {
                session,
                interaction,
                controller,
                depths,
                pending: None,
            },
            rx,
        ))
    }

    /// Creates a table from configuration. Light moves first.
    pub fn from_config(
        config: &ShellConfig,
        oracle: Arc<dyn MoveOracle>,
        engine: Arc<dyn SearchEngine>,
    ) -> Result<(Self, GameEvents), TableError> {
        let board = config.build_board()?;
        Ok(Self::new(
            board,
            Side::Light,
            config.seating(),
            config.search_depths(),
            config.ply_limit(),
            oracle,
            engine,
        )?)
    }

    /// Returns the shared session.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Returns the engine runner.
    pub fn controller(&self) -> &AiRunController {
        &self.controller
    }

    /// Returns the interaction machine.
    pub fn interaction(&self) -> &InteractionMachine {
        &self.interaction
    }

    /// Returns the current run mode.
    pub fn run_mode(&self) -> RunMode {
        self.controller.run_mode()
    }

    /// Returns the per-side search depths.
    pub fn depths(&self) -> SearchDepths {
        self.depths
    }

    /// Renders the board as text.
    pub fn board_text(&self) -> String {
        self.session.lock().board().display()
    }

    /// Activates `square`, scheduling the engine's reply when one is due.
    ///
    /// If the engine holds the move and nothing is running, its move is
    /// scheduled first and the activation is rejected as
    /// [`crate::RejectReason::EngineRunning`].
    pub fn activate(&mut self, square: Square) -> InteractionResult {
        if self.resume() {
            debug!("Engine turn was left unplayed; scheduled before activation");
        }
        let result = self.interaction.activate(square);
        if let InteractionResult::MoveApplied(applied) = &result
            && applied.outcome.is_none()
        {
            self.reply_for(applied.new_turn);
        }
        result
    }

    /// Schedules an engine move if the engine is seated on the side to move.
    ///
    /// Returns true if a move was scheduled.
    pub fn resume(&mut self) -> bool {
        let (open, to_move) = {
            let session = self.session.lock();
            (!session.is_over(), session.to_move())
        };
        open && self.run_mode() == RunMode::Idle && self.reply_for(to_move)
    }

    /// Starts engine-vs-engine play with the configured depths.
    pub fn start_continuous(&mut self) -> Result<bool, ControllerError> {
        self.interaction.clear_selection();
        self.controller.start_continuous(self.depths)
    }

    /// Asks a continuous run to end.
    pub fn stop(&self) -> bool {
        self.controller.stop()
    }

    /// Starts a continuous run when idle, or asks a running one to stop.
    #[instrument(skip(self))]
    pub fn toggle_automation(&mut self) -> Result<Automation, ControllerError> {
        if self.run_mode() == RunMode::ContinuousAI {
            self.stop();
            return Ok(Automation::Stopping);
        }
        self.start_continuous()?;
        Ok(Automation::Started)
    }

    /// Waits for a continuous run to end, then schedules the engine's move
    /// if the run stopped on its turn.
    ///
    /// Returns `None` if no run was started since the last call.
    pub async fn after_run(&mut self) -> Option<StopReason> {
        let reason = self.controller.finished().await;
        if self.resume() {
            debug!(?reason, "Engine move scheduled after run");
        }
        reason
    }

    /// Collects a finished automated move and schedules the engine's turn
    /// if one is due.
    ///
    /// Does nothing while a run is active. After a failed move nothing is
    /// rescheduled; the next activation retries.
    pub async fn catch_up(&mut self) -> bool {
        if self.run_mode() != RunMode::Idle {
            return false;
        }
        if let Some(reason) = self.controller.finished().await {
            debug!(%reason, "Continuous run collected");
        }
        if let Some(Err(err)) = self.settle().await {
            warn!(error = %err, "Automated move failed, waiting for input");
            return false;
        }
        self.resume()
    }

    /// Lets the engine play the side to move on a spawned task.
    ///
    /// Returns once the move is claimed; [`Self::settle`] or
    /// [`Self::catch_up`] collects it.
    #[instrument(skip(self))]
    pub fn request_engine_move(&mut self) -> Result<(), ControllerError> {
        self.interaction.clear_selection();
        let side = self.session.lock().to_move();
        let handle = self
            .controller
            .spawn_automated_move(self.depths.for_side(side))?;
        self.pending = Some(handle);
        Ok(())
    }

    /// Lets the engine play the side to move, then schedules the reply if one is due.
    pub async fn play_one_automated_move(&mut self) -> Result<AppliedMove, ControllerError> {
        self.interaction.clear_selection();
        let side = self.session.lock().to_move();
        let applied = self
            .controller
            .play_one_automated_move(self.depths.for_side(side))
            .await?;
        if applied.outcome.is_none() {
            self.reply_for(applied.new_turn);
        }
        Ok(applied)
    }

    /// Waits for a scheduled engine reply to finish.
    ///
    /// Returns `None` if no reply was pending.
    pub async fn settle(&mut self) -> Option<Result<AppliedMove, ControllerError>> {
        let handle = self.pending.take()?;
        Some(handle.await.unwrap_or_else(|err| {
            Err(ControllerError::SearchEngineFailure(format!(
                "engine reply task died: {err}"
            )))
        }))
    }

    fn reply_for(&mut self, side: Side) -> bool {
        if !self.interaction.seating().engine_plays(side) {
            return false;
        }
        match self
            .controller
            .spawn_automated_move(self.depths.for_side(side))
        {
            Ok(handle) => {
                debug!(%side, "Engine reply scheduled");
                self.pending = Some(handle);
                true
            }
            Err(err) => {
                warn!(error = %err, "Could not schedule engine reply");
                false
            }
        }
    }
}
