//! Text-mode front end: an interactive play loop and an engine-vs-engine viewer.

use crate::config::ShellConfig;
use crate::controller::RunMode;
use crate::events::{GameEvent, GameEvents};
use crate::interaction::InteractionResult;
use crate::session::SharedSession;
use crate::table::GameTable;
use anyhow::Result;
use duelboard_rules::{MaterialSearch, Square, StandardRules};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// How events are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFormat {
    /// Human-readable lines, with the board after every move.
    Text,
    /// One JSON object per event.
    Json,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line.
    Empty,
    /// Activate a square.
    Activate(Square),
    /// Start or stop engine-vs-engine play.
    ToggleAi,
    /// Let the engine play the side to move once.
    EngineMove,
    /// Print the board.
    Board,
    /// Leave the shell.
    Quit,
    /// Anything else.
    Unknown(String),
}

impl ShellCommand {
    /// Parses one input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "ai" => Self::ToggleAi,
            "engine" => Self::EngineMove,
            "board" => Self::Board,
            "quit" | "exit" => Self::Quit,
            other => other
                .parse::<Square>()
                .map(Self::Activate)
                .unwrap_or_else(|_| Self::Unknown(line.to_string())),
        }
    }
}

fn reference_table(config: &ShellConfig) -> Result<(GameTable, GameEvents)> {
    Ok(GameTable::from_config(
        config,
        Arc::new(StandardRules::new()),
        Arc::new(MaterialSearch::new()),
    )?)
}

/// Runs the interactive play loop on stdin until `quit` or end of input.
#[instrument(skip(config))]
pub async fn play(config: ShellConfig) -> Result<()> {
    let (mut table, events) = reference_table(&config)?;
    let printer = tokio::spawn(print_events(
        events,
        EventFormat::Text,
        Some(table.session().clone()),
    ));

    println!("{}", table.board_text());
    println!(
        "You play {} against {}. Enter a square (e2 or 4,1), ai, engine, board or quit.",
        config.human_side(),
        config.opponent()
    );
    table.resume();

    let mut mode = table.controller().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = ShellCommand::parse(&line);
                debug!(?command, "Shell input");
                match command {
                    ShellCommand::Empty => {}
                    ShellCommand::Quit => break,
                    ShellCommand::Board => println!("{}", table.board_text()),
                    ShellCommand::ToggleAi => match table.toggle_automation() {
                        Ok(automation) => println!("Engine run: {automation}"),
                        Err(err) => println!("{err}"),
                    },
                    ShellCommand::EngineMove => {
                        if let Err(err) = table.request_engine_move() {
                            println!("{err}");
                        }
                    }
                    ShellCommand::Activate(square) => report(table.activate(square)),
                    ShellCommand::Unknown(text) => println!("Unrecognised input: {text}"),
                }
            }
            Ok(()) = mode.changed() => {
                let now = *mode.borrow_and_update();
                if now == RunMode::Idle && table.catch_up().await {
                    debug!("Engine turn scheduled after automated play");
                }
            }
        }
    }

    table.stop();
    table.controller().finished().await;
    table.settle().await;
    drop(table);
    printer.await??;
    Ok(())
}

/// Lets the engine play both sides until the game ends or Ctrl-C.
#[instrument(skip(config))]
pub async fn watch(config: ShellConfig, format: EventFormat) -> Result<()> {
    let (mut table, events) = reference_table(&config)?;
    let session = (format == EventFormat::Text).then(|| table.session().clone());
    let printer = tokio::spawn(print_events(events, format, session));

    if format == EventFormat::Text {
        println!("{}", table.board_text());
    }
    table.start_continuous()?;

    let reason = {
        let finished = table.controller().finished();
        tokio::pin!(finished);
        tokio::select! {
            reason = &mut finished => reason,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping engine run");
                table.stop();
                finished.await
            }
        }
    };
    if let Some(reason) = reason {
        info!(%reason, "Watch finished");
    }

    drop(table);
    printer.await??;
    Ok(())
}

fn report(result: InteractionResult) {
    match result {
        InteractionResult::Highlighted(destinations) if destinations.is_empty() => {
            println!("That piece has no legal moves");
        }
        InteractionResult::Highlighted(destinations) => {
            let squares: Vec<String> = destinations.iter().map(Square::to_string).collect();
            println!("Destinations: {}", squares.join(" "));
        }
        InteractionResult::MoveApplied(_) => {}
        InteractionResult::Deselected => println!("Selection cleared"),
        InteractionResult::Rejected(reason) => println!("Rejected: {reason}"),
        InteractionResult::GameOver(outcome) => println!("Game over: {outcome}"),
    }
}

/// Writes events to stdout until every sender is gone.
///
/// In text mode the board is printed after each move when `session` is given.
pub async fn print_events(
    mut events: GameEvents,
    format: EventFormat,
    session: Option<SharedSession>,
) -> Result<()> {
    while let Some(event) = events.recv().await {
        match format {
            EventFormat::Json => println!("{}", serde_json::to_string(&event)?),
            EventFormat::Text => print_text(&event, session.as_ref()),
        }
    }
    debug!("Event stream closed");
    Ok(())
}

fn print_text(event: &GameEvent, session: Option<&SharedSession>) {
    match event {
        GameEvent::MoveApplied(applied) => {
            println!("{}. {}", applied.ply + 1, applied);
            if let Some(session) = session {
                println!("{}", session.lock().board().display());
            }
        }
        GameEvent::GameOver(outcome) => println!("Game over: {outcome}"),
        GameEvent::RunModeChanged(RunMode::ContinuousAI) => println!("Engine is playing both sides"),
        GameEvent::RunFinished(reason) => println!("Engine run finished: {reason}"),
        GameEvent::EngineFailure(detail) => println!("Engine failure: {detail}"),
        GameEvent::RunModeChanged(_) | GameEvent::SelectionChanged { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("  "), ShellCommand::Empty);
        assert_eq!(ShellCommand::parse("AI"), ShellCommand::ToggleAi);
        assert_eq!(ShellCommand::parse("engine"), ShellCommand::EngineMove);
        assert_eq!(ShellCommand::parse("board\n"), ShellCommand::Board);
        assert_eq!(ShellCommand::parse("exit"), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_squares() {
        assert_eq!(
            ShellCommand::parse("e2"),
            ShellCommand::Activate(Square::new(4, 1))
        );
        assert_eq!(
            ShellCommand::parse("4,1"),
            ShellCommand::Activate(Square::new(4, 1))
        );
        assert_eq!(
            ShellCommand::parse("castle"),
            ShellCommand::Unknown("castle".to_string())
        );
    }
}
