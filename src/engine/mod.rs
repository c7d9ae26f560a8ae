//! Command dispatch and timed action plumbing.
//!
//! - [`pattern`] - argument patterns and extracted [`Args`]
//! - [`command`] - the [`Command`] trait and the result protocol
//! - [`registry`] - commands by name and alias
//! - [`processor`] - routes raw input to a command
//! - [`lock`] - the single-holder input lock and stop flags
//! - [`scheduler`] - one-tick-per-period driving of timed actions

pub mod command;
pub mod lock;
pub mod pattern;
pub mod processor;
pub mod registry;
pub mod scheduler;

pub use command::{Command, CommandError, Output, RunResult};
pub use lock::{ActionHandle, ActionId, ActionLock, StopFlag};
pub use pattern::{Args, Pattern, PatternSet};
pub use processor::CommandProcessor;
pub use registry::CommandRegistry;
pub use scheduler::{ActionMode, ScheduledAction, TickFlow, TickScheduler, TimedAction};
