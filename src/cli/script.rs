//! Headless command scripts
//!
//! `redboard run <file>` replays a script against a fresh board on a manual
//! clock and prints the final state. One command per line:
//!
//! ```text
//! add recon Scan ports        # add a card (text may contain spaces)
//! done recon task1            # complete a card
//! drag recon 0 exploit 1      # drop a card at another slot
//! drag recon 0 -              # pick up and cancel
//! wait 5                      # let 5 seconds pass, firing due timers
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use thiserror::Error;

use super::output::Output;
use super::report::BoardReport;
use crate::config::Config;
use crate::domain::{BoardEngine, BoardError, CardId, DragOutcome, LaneId, ManualClock, Slot};

const MAX_WAIT_SECONDS: u64 = 86_400;

#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: {source}")]
    Board {
        line: usize,
        #[source]
        source: BoardError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Add { lane: LaneId, text: String },
    Done { lane: LaneId, card: CardId },
    Drag(DragOutcome),
    Wait(u64),
}

fn parse_index(token: Option<&str>, what: &str) -> Result<usize, String> {
    let token = token.ok_or_else(|| format!("missing {}", what))?;
    token
        .parse()
        .map_err(|_| format!("invalid {} '{}'", what, token))
}

fn parse_lane(token: Option<&str>) -> Result<LaneId, String> {
    token
        .ok_or_else(|| "missing lane".to_string())?
        .parse()
        .map_err(|e: crate::domain::IdError| e.to_string())
}

/// Parses one line; `Ok(None)` for blanks and comments
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let mut args = rest.split_whitespace();

    let command = match verb {
        "add" => {
            let lane = parse_lane(args.next())?;
            // keep the raw remainder so the engine sees the untrimmed text
            let text = rest.trim_start().strip_prefix(lane.as_str()).unwrap_or("");
            ScriptCommand::Add {
                lane,
                text: text.to_string(),
            }
        }
        "done" => {
            let lane = parse_lane(args.next())?;
            let card = args
                .next()
                .ok_or_else(|| "missing card id".to_string())?
                .parse()
                .map_err(|e: crate::domain::IdError| e.to_string())?;
            ScriptCommand::Done { lane, card }
        }
        "drag" => {
            let source = Slot::new(parse_lane(args.next())?, parse_index(args.next(), "index")?);
            match args.next() {
                Some("-") => ScriptCommand::Drag(DragOutcome::cancelled(source)),
                dest_lane => {
                    let dest = Slot::new(parse_lane(dest_lane)?, parse_index(args.next(), "index")?);
                    ScriptCommand::Drag(DragOutcome::dropped(source, dest))
                }
            }
        }
        "wait" => {
            let secs = parse_index(args.next(), "seconds")? as u64;
            if secs > MAX_WAIT_SECONDS {
                return Err(format!("wait is capped at {} seconds", MAX_WAIT_SECONDS));
            }
            ScriptCommand::Wait(secs)
        }
        other => return Err(format!("unknown command '{}'", other)),
    };

    if !matches!(command, ScriptCommand::Add { .. }) {
        if let Some(extra) = args.next() {
            return Err(format!("unexpected argument '{}'", extra));
        }
    }

    Ok(Some(command))
}

/// Parses a whole script, pairing commands with 1-based line numbers
pub fn parse(source: &str) -> Result<Vec<(usize, ScriptCommand)>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;
        match parse_line(line) {
            Ok(Some(cmd)) => commands.push((line_no, cmd)),
            Ok(None) => {}
            Err(message) => {
                return Err(ScriptError::Parse {
                    line: line_no,
                    message,
                })
            }
        }
    }
    Ok(commands)
}

/// Runs parsed commands, ticking the engine after each one
pub fn execute(
    engine: &mut BoardEngine,
    clock: &ManualClock,
    commands: &[(usize, ScriptCommand)],
    output: &Output,
) -> Result<(), ScriptError> {
    for (line, command) in commands {
        let board_err = |source| ScriptError::Board {
            line: *line,
            source,
        };

        match command {
            ScriptCommand::Add { lane, text } => {
                let added = engine.add_task(lane, text).map_err(board_err)?;
                match added {
                    Some(card) => output.verbose_ctx("run", &format!("line {}: added {}", line, card.id)),
                    None => output.verbose_ctx("run", &format!("line {}: blank text ignored", line)),
                }
            }
            ScriptCommand::Done { lane, card } => {
                engine.mark_done(lane, card).map_err(board_err)?;
                output.verbose_ctx("run", &format!("line {}: completed {}", line, card));
            }
            ScriptCommand::Drag(outcome) => {
                let changed = engine.drag(outcome).map_err(board_err)?;
                output.verbose_ctx("run", &format!("line {}: drag changed board: {}", line, changed));
            }
            ScriptCommand::Wait(secs) => {
                clock.advance(Duration::seconds(*secs as i64));
            }
        }

        let fired = engine.tick();
        if fired > 0 {
            output.verbose_ctx("run", &format!("line {}: {} timer(s) fired", line, fired));
        }
    }
    Ok(())
}

/// Entry point for `redboard run`
pub fn run(output: &Output, config: &Config, path: &Path) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    let commands = parse(&source).with_context(|| format!("Invalid script: {}", path.display()))?;
    output.verbose_ctx("run", &format!("Parsed {} command(s)", commands.len()));

    let clock = ManualClock::new(Utc::now());
    let mut engine = BoardEngine::new(
        config.build_board()?,
        config.engine_settings(),
        config.heartbeat(),
        Box::new(clock.clone()),
    );

    execute(&mut engine, &clock, &commands, output)
        .with_context(|| format!("Script failed: {}", path.display()))?;

    BoardReport::from_engine(&engine)?.print(output, true);
    engine.shutdown();
    Ok(())
}
