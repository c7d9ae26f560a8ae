//! Tick scheduling for timed actions.
//!
//! Tick logic and timer plumbing are kept apart. A [`TimedAction`] only knows
//! how to advance by one tick given the context; [`ScheduledAction::step`]
//! adds the bookkeeping that runs when an action finishes (restoring the
//! stamina regeneration offset, releasing the lock or the device slot).
//! [`TickScheduler`] drives steps in real time: one tokio task per action,
//! sleeping one tick period, taking the context lock, stepping, and sleeping
//! again only after the step returned. A task owns its action outright, so a
//! session can never have two timers in flight.

use log::{debug, info};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::lock::{ActionHandle, ActionId};
use crate::world::{GameContext, SharedContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Finish,
}

/// One session of a long-running action.
pub trait TimedAction: Send {
    fn tick(&mut self, ctx: &mut GameContext) -> TickFlow;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionMode {
    /// Holds the action lock; the player is busy.
    Foreground,
    /// Runs inside a device without locking input.
    Background { device: String },
}

pub struct ScheduledAction {
    handle: ActionHandle,
    mode: ActionMode,
    stamina_offset: f64,
    action: Box<dyn TimedAction>,
    ticks: u32,
    finished: bool,
}

impl ScheduledAction {
    pub fn new(
        handle: ActionHandle,
        mode: ActionMode,
        stamina_offset: f64,
        action: Box<dyn TimedAction>,
    ) -> Self {
        Self {
            handle,
            mode,
            stamina_offset,
            action,
            ticks: 0,
            finished: false,
        }
    }

    pub fn id(&self) -> ActionId {
        self.handle.id
    }

    pub fn label(&self) -> &str {
        &self.handle.label
    }

    pub fn mode(&self) -> &ActionMode {
        &self.mode
    }

    /// Ticks stepped so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance by one tick. On `Finish` the regeneration offset is undone
    /// and the lock (or the device slot) is released if still ours.
    pub fn step(&mut self, ctx: &mut GameContext) -> TickFlow {
        if self.finished {
            return TickFlow::Finish;
        }
        self.ticks += 1;
        let flow = self.action.tick(ctx);
        if flow == TickFlow::Finish {
            self.finish(ctx);
        }
        flow
    }

    fn finish(&mut self, ctx: &mut GameContext) {
        self.finished = true;
        ctx.player.stamina_change += self.stamina_offset;
        match &self.mode {
            ActionMode::Foreground => {
                ctx.lock.release(self.handle.id);
            }
            ActionMode::Background { device } => {
                ctx.release_background(device, self.handle.id);
            }
        }
        info!(
            "action {} finished after {} ticks",
            self.handle.label, self.ticks
        );
    }

    /// Step until the action finishes or `max_ticks` steps have run, with no
    /// delay between steps. Returns the number of steps taken.
    pub fn run_to_completion(&mut self, ctx: &mut GameContext, max_ticks: u32) -> u32 {
        let start = self.ticks;
        while !self.finished && self.ticks - start < max_ticks {
            self.step(ctx);
        }
        self.ticks - start
    }
}

/// Spawns real-time tick loops.
#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    period: Duration,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Drive `action` until it finishes. The task resolves to the number of
    /// ticks it ran.
    pub fn spawn(&self, ctx: SharedContext, mut action: ScheduledAction) -> JoinHandle<u32> {
        let period = self.period;
        debug!("scheduling action {} every {:?}", action.label(), period);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                let mut guard = ctx.lock().await;
                let flow = action.step(&mut guard);
                guard.console.flush();
                if flow == TickFlow::Finish {
                    return action.ticks();
                }
            }
        })
    }

    /// Passive regeneration of stamina and power, once per period, forever.
    pub fn spawn_world_clock(&self, ctx: SharedContext) -> JoinHandle<()> {
        let period = self.period;
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                let mut guard = ctx.lock().await;
                guard.player.regenerate();
                guard.power.regenerate();
            }
        })
    }
}
