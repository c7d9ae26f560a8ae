//! The single input channel.
//!
//! Every line the player types goes through [`InputChannel::submit`]. While
//! an action holds the lock only `stop` gets through; other input is
//! recorded in history and answered with a busy message. Otherwise the line
//! is echoed, recorded and dispatched to the root processor or to the
//! processor of the device the player is using.

use log::debug;
use std::collections::HashMap;

use super::history::CommandHistory;
use crate::commands::{device_processor, root_processor};
use crate::engine::{CommandError, CommandProcessor};
use crate::errors::EngineError;
use crate::logutil::escape_log;
use crate::world::{Catalog, GameContext};

pub const STOP: &str = "stop";
const MSG_BUSY: &str = "> Busy. Type {!b}stop{/} to end current task.";
const MSG_NOTHING_TO_STOP: &str = "> Nothing to stop.";
const MSG_UNKNOWN: &str = "> Unknown command. Type {!b}help{/} for a list.";
const MSG_OPAQUE: &str = "> unknown error";

/// What happened to one submitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Blank input, ignored.
    Empty,
    /// Rejected because an action holds the lock.
    Busy,
    /// `stop` reached a running action.
    Stopped,
    /// `stop` with nothing running.
    NothingToStop,
    /// A command claimed the input (it may still have failed).
    Dispatched,
    /// No command claimed the input.
    Unhandled,
}

pub struct InputChannel {
    root: CommandProcessor,
    devices: HashMap<String, CommandProcessor>,
    history: CommandHistory,
}

impl InputChannel {
    pub fn new(catalog: &Catalog, history_size: usize) -> Result<Self, EngineError> {
        let mut devices = HashMap::new();
        for device in catalog.items.devices() {
            devices.insert(device.id.clone(), device_processor(device)?);
        }
        Ok(Self {
            root: root_processor()?,
            devices,
            history: CommandHistory::new(history_size),
        })
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn submit(&mut self, ctx: &mut GameContext, raw: &str) -> Submission {
        let input = raw.trim();
        if input.is_empty() {
            return Submission::Empty;
        }
        let is_stop = input == STOP;

        if ctx.lock.is_locked() {
            if is_stop {
                ctx.lock.stop_holder(&mut ctx.console);
                return Submission::Stopped;
            }
            debug!("busy, rejected input={}", escape_log(input));
            self.history.add(input);
            ctx.console.append_line(MSG_BUSY, "error");
            return Submission::Busy;
        }

        if is_stop {
            let device = ctx.current_device.clone();
            if let Some(device) = device {
                if ctx.stop_background(&device) {
                    return Submission::Stopped;
                }
            }
            ctx.console.append_line(MSG_NOTHING_TO_STOP, "error");
            return Submission::NothingToStop;
        }

        ctx.console.append_line(format!("$ {}", input), "user");
        self.history.add(input);

        let processor = match &ctx.current_device {
            Some(id) => self.devices.get(id).unwrap_or(&self.root),
            None => &self.root,
        };
        match processor.run(ctx, input) {
            None => {
                ctx.console.append_line(MSG_UNKNOWN, "error");
                Submission::Unhandled
            }
            Some(Err(CommandError::Opaque)) => {
                ctx.console.append_line(MSG_OPAQUE, "error");
                Submission::Dispatched
            }
            Some(Err(CommandError::User(message))) => {
                ctx.console.append(&message, "error", "> ");
                Submission::Dispatched
            }
            Some(Ok(output)) => {
                for line in output.lines() {
                    ctx.console.append_line(line.text, &line.classes);
                }
                Submission::Dispatched
            }
        }
    }
}
