//! Interactive session: stdin in, rendered console lines out.
//!
//! The [`Shell`] owns the input channel and the shared [`GameContext`].
//! Submitting a line locks the context, runs it through the input channel
//! and hands any actions the command queued to the [`TickScheduler`], one
//! task per action. A printer task renders console events as they arrive,
//! so lines written by ticks show up while the player is idle at the prompt.

use anyhow::Result;
use log::{debug, info, warn};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::console::markup::{render, RenderStyle};
use crate::console::{ConsoleEvent, InputChannel, LineId, Submission};
use crate::engine::TickScheduler;
use crate::errors::EngineError;
use crate::logutil::escape_log;
use crate::world::{Catalog, GameContext, SharedContext};

pub struct Shell {
    ctx: SharedContext,
    input: InputChannel,
    scheduler: TickScheduler,
    actions: Vec<JoinHandle<u32>>,
}

impl Shell {
    pub fn new(config: &Config, catalog: Arc<Catalog>) -> Result<Self, EngineError> {
        let input = InputChannel::new(&catalog, config.console.history_size)?;
        let ctx = GameContext::new(config, catalog).into_shared();
        Ok(Self {
            ctx,
            input,
            scheduler: TickScheduler::new(config.engine.tick_period()),
            actions: Vec::new(),
        })
    }

    pub fn context(&self) -> SharedContext {
        Arc::clone(&self.ctx)
    }

    pub fn input(&self) -> &InputChannel {
        &self.input
    }

    /// Number of action tasks still ticking.
    pub fn running_actions(&mut self) -> usize {
        self.actions.retain(|task| !task.is_finished());
        self.actions.len()
    }

    /// Submit one line and schedule whatever actions it started.
    pub async fn submit(&mut self, line: &str) -> Submission {
        let mut guard = self.ctx.lock().await;
        let outcome = self.input.submit(&mut guard, line);
        let pending = guard.take_pending();
        guard.console.flush();
        drop(guard);

        for action in pending {
            debug!("spawning tick task for {}", action.label());
            let task = self.scheduler.spawn(Arc::clone(&self.ctx), action);
            self.actions.push(task);
        }
        outcome
    }

    pub fn start_clock(&self) -> JoinHandle<()> {
        self.scheduler.spawn_world_clock(Arc::clone(&self.ctx))
    }

    /// Route console output to stdout.
    pub async fn attach_printer(&self, style: RenderStyle) -> JoinHandle<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut guard = self.ctx.lock().await;
            guard.console.attach_sink(tx);
            let prompt = guard.prompt.clone();
            guard.console.set_prompt(&prompt);
            guard.console.flush();
        }
        tokio::spawn(print_events(rx, style))
    }

    /// Read commands from stdin until EOF or Ctrl-C.
    pub async fn run_stdin(mut self, style: RenderStyle) -> Result<()> {
        let printer = self.attach_printer(style).await;
        let clock = self.start_clock();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            let outcome = self.submit(&line).await;
                            debug!("input={} outcome={:?}", escape_log(&line), outcome);
                        }
                        None => {
                            info!("stdin closed");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        clock.abort();
        let running = self.running_actions();
        if running > 0 {
            warn!("abandoning {} running action(s)", running);
        }
        for task in self.actions.drain(..) {
            task.abort();
        }
        printer.abort();
        Ok(())
    }
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<ConsoleEvent>, style: RenderStyle) {
    let mut last_printed: Option<LineId> = None;
    let mut prompt = String::new();
    while let Some(event) = rx.recv().await {
        let mut out = std::io::stdout().lock();
        let written = match event {
            ConsoleEvent::Append { id, line } => {
                last_printed = Some(id);
                writeln!(out, "\r{}", render(&line, style))
            }
            ConsoleEvent::Update { id, line } => {
                // rewrite in place only when it is still the bottom line
                if style == RenderStyle::Ansi && last_printed == Some(id) {
                    writeln!(out, "\x1b[1A\x1b[2K\r{}", render(&line, style))
                } else {
                    last_printed = Some(id);
                    writeln!(out, "\r{}", render(&line, style))
                }
            }
            ConsoleEvent::Prompt(next) => {
                prompt = next;
                Ok(())
            }
        };
        let flushed = written
            .and_then(|_| write!(out, "{} ", prompt))
            .and_then(|_| out.flush());
        if let Err(e) = flushed {
            warn!("stdout write failed: {}", e);
            break;
        }
    }
}
