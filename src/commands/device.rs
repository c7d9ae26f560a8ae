//! Entering and leaving devices.

use log::info;

use crate::console::ConsoleLine;
use crate::engine::{Args, Command, CommandError, Output, PatternSet, RunResult};
use crate::errors::EngineError;
use crate::text::with_article;
use crate::world::{GameContext, ItemCategory};

/// `use <device>`: switch input to a built device.
pub struct UseCommand {
    patterns: PatternSet,
}

impl UseCommand {
    pub fn new() -> Result<Self, EngineError> {
        let patterns = PatternSet::builder("use")
            .regex(r"(?:the\s+|an?\s+)?(?P<name>.+)")
            .build()?;
        Ok(Self { patterns })
    }
}

impl Command for UseCommand {
    fn name(&self) -> &str {
        "use"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, ctx: &mut GameContext, args: &Args) -> RunResult {
        let name = args.get("name").ok_or(CommandError::Opaque)?;
        let missing = || CommandError::user(format!("You don't have {}.", with_article(name)));
        let item = ctx.catalog.items.find(name).ok_or_else(missing)?.clone();
        if item.category != ItemCategory::Device {
            return Err(CommandError::user(format!(
                "You can't use the {} like that.",
                item.name
            )));
        }
        if ctx.devices.built(&item.id) == 0 {
            return Err(missing());
        }
        info!("entering device {}", item.id);
        ctx.set_current_device(Some(item.id.clone()));
        Ok(Output::Lines(vec![
            ConsoleLine::plain(format!("You are now using the {}.", item.name)),
            ConsoleLine::new(
                "Type {!b}recipes{/} to see what it makes, {!b}quit{/} to leave.",
                "tip",
            ),
        ]))
    }

    fn help(&self) -> Option<String> {
        Some("use <device> - work with a device you have built".to_string())
    }
}

/// `quit` inside a device.
pub struct QuitCommand {
    patterns: PatternSet,
}

impl QuitCommand {
    pub fn new() -> Self {
        Self {
            patterns: PatternSet::catch_all(),
        }
    }
}

impl Default for QuitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for QuitCommand {
    fn name(&self) -> &str {
        "quit"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, ctx: &mut GameContext, _args: &Args) -> RunResult {
        ctx.set_current_device(None);
        Ok(Output::Lines(vec![ConsoleLine::new(
            "You stopped using the device.",
            "tip",
        )]))
    }

    fn help(&self) -> Option<String> {
        Some("quit - step away from the device".to_string())
    }
}
