//! Duelboard - turn and selection core for two-player board games
//!
//! A human plays against another human or the engine; the engine can also
//! play both sides on its own while the interactive surface stays live.
//!
//! # Architecture
//!
//! - **Session**: board, side to move and outcome behind one lock
//! - **Interaction**: square activations become selections and moves
//! - **Controller**: single automated moves and cancellable engine-vs-engine runs
//! - **Events**: one ordered notification stream for any display
//! - **Table**: composition root wiring the above to a [`MoveOracle`] and a [`SearchEngine`]
//!
//! # Example
//!
//! ```no_run
//! use duelboard::{GameTable, ShellConfig};
//! use duelboard_rules::{MaterialSearch, Square, StandardRules};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ShellConfig::default();
//! let (mut table, _events) = GameTable::from_config(
//!     &config,
//!     Arc::new(StandardRules::new()),
//!     Arc::new(MaterialSearch::new()),
//! )?;
//!
//! table.activate("e2".parse::<Square>()?);
//! table.activate("e4".parse::<Square>()?);
//! table.settle().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod controller;
mod events;
mod interaction;
mod session;
mod table;

pub mod shell;

pub use config::{
    ConfigError, DEFAULT_DEPTH, DepthSettings, Layout, MAX_DEPTH, MIN_DEPTH, Opponent, Seating,
    ShellConfig,
};
pub use controller::{AiRunController, ControllerError, RunMode, SearchDepths, StopReason};
pub use events::{EventSink, GameEvent, GameEvents};
pub use interaction::{
    InteractionMachine, InteractionResult, InteractionState, RejectReason, Selection,
};
pub use session::{
    AlternatingTurnInvariant, AppliedMove, BoardConsistentInvariant, GameSession, Invariant,
    InvariantSet, InvariantViolation, SessionError, SessionInvariants, SharedSession,
    TerminalOutcomeInvariant,
};
pub use table::{Automation, GameTable, TableError};

pub use duelboard_rules::{MoveOracle, SearchEngine};
