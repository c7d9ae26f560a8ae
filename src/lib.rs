//! # Tickforge - tick-driven crafting and gathering engine
//!
//! Tickforge runs the long-lived actions of a single-player text simulation:
//! gathering resources and building items, supports and devices. Actions
//! advance one tick per second, consume stamina, power and inventory through
//! recipe and probability tables, and hold an exclusive lock on the player's
//! input channel while they run.
//!
//! ## Features
//!
//! - **Pattern dispatch**: commands declare ordered regex patterns; the first match supplies named arguments.
//! - **Timed actions**: one tokio task per action, ticking on a fixed period, cancelled cooperatively with `stop`.
//! - **Gathering**: independent per-item rolls, tool wear, stamina and fatigue limits, tag-range tool specifiers.
//! - **Construction**: fractional per-tick input consumption, multi-unit batches, resumable partial builds, land accounting.
//! - **Devices**: built devices get their own command set; non-interactive ones work in the background on stored power.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tickforge::config::Config;
//! use tickforge::console::markup::RenderStyle;
//! use tickforge::shell::Shell;
//! use tickforge::world::Catalog;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let catalog = Arc::new(Catalog::embedded()?);
//!     let shell = Shell::new(&config, catalog)?;
//!     shell.run_stdin(RenderStyle::Plain).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - patterns, commands, registry, processor, action lock, tick scheduler
//! - [`gather`] - the gather command and session
//! - [`construct`] - make/build commands and construction sessions
//! - [`commands`] - help, inventory, status, recipes and device commands
//! - [`world`] - catalogs, inventory, player, land, power and the shared game context
//! - [`console`] - line buffer, markup, history and the input channel
//! - [`shell`] - the interactive stdin session
//! - [`config`] - configuration management and validation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  InputChannel   │ ← lock check, echo, history
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │CommandProcessor │ ← verb + pattern dispatch
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  TickScheduler  │ ← gather / construction sessions
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   GameContext   │ ← player, inventory, land, registries
//! └─────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod console;
pub mod construct;
pub mod engine;
pub mod errors;
pub mod gather;
pub mod logutil;
pub mod shell;
pub mod text;
pub mod world;
