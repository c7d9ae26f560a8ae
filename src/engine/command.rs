//! The command interface and the result protocol.
//!
//! Dispatch yields `Option<RunResult>`:
//!
//! - `None` - no command claimed the input
//! - `Err(CommandError::Opaque)` - handled, failed without a message
//! - `Err(CommandError::User(msg))` - handled, failed with a message for the player
//! - `Ok(Output)` - handled; zero or more lines to show
//!
//! Commands that start a timed action return `Ok(Output::None)` after
//! writing their own opening line and queueing the action on the context.

use thiserror::Error;

use super::pattern::{Args, PatternSet};
use crate::console::ConsoleLine;
use crate::world::GameContext;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown error")]
    Opaque,
    #[error("{0}")]
    User(String),
}

impl CommandError {
    pub fn user(message: impl Into<String>) -> Self {
        CommandError::User(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    None,
    Text(String),
    Lines(Vec<ConsoleLine>),
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Output::Text(text.into())
    }

    pub fn lines(&self) -> Vec<ConsoleLine> {
        match self {
            Output::None => Vec::new(),
            Output::Text(text) => vec![ConsoleLine::plain(text.clone())],
            Output::Lines(lines) => lines.clone(),
        }
    }
}

pub type RunResult = Result<Output, CommandError>;

/// A registered command.
///
/// Commands hold no per-run state: anything a timed action needs between
/// ticks lives in the session value the command creates inside `run`.
pub trait Command: Send + Sync {
    /// Canonical verb.
    fn name(&self) -> &str;

    fn patterns(&self) -> &PatternSet;

    fn run(&self, ctx: &mut GameContext, args: &Args) -> RunResult;

    fn help(&self) -> Option<String> {
        None
    }

    /// Hidden commands are left out of help listings.
    fn hidden(&self) -> bool {
        false
    }
}
