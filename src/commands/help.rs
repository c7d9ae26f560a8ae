use std::sync::OnceLock;

use crate::console::ConsoleLine;
use crate::engine::{Args, Command, CommandError, CommandRegistry, Output, PatternSet, RunResult};
use crate::errors::EngineError;
use crate::world::GameContext;

#[derive(Debug, Clone)]
struct HelpEntry {
    verbs: Vec<String>,
    text: Option<String>,
}

/// `help [command]`
///
/// The index of what to list is installed once the processor's registry is
/// complete, since the help command is itself part of that registry.
pub struct HelpCommand {
    patterns: PatternSet,
    index: OnceLock<Vec<HelpEntry>>,
}

impl HelpCommand {
    pub fn new() -> Result<Self, EngineError> {
        let patterns = PatternSet::builder("help")
            .regex(r"(?P<topic>\S+)")
            .catch_all()
            .build()?;
        Ok(Self {
            patterns,
            index: OnceLock::new(),
        })
    }

    pub fn install(&self, registry: &CommandRegistry) {
        let entries = registry
            .iter()
            .filter(|(command, _)| !command.hidden())
            .map(|(command, verbs)| HelpEntry {
                verbs: verbs.to_vec(),
                text: command.help(),
            })
            .collect();
        if self.index.set(entries).is_err() {
            log::warn!("help index installed twice; keeping the first");
        }
    }

    fn entries(&self) -> &[HelpEntry] {
        self.index.get().map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, _ctx: &mut GameContext, args: &Args) -> RunResult {
        if let Some(topic) = args.get("topic") {
            let topic = topic.to_lowercase();
            let entry = self
                .entries()
                .iter()
                .find(|entry| entry.verbs.iter().any(|v| *v == topic))
                .ok_or_else(|| CommandError::user(format!("No help for '{}'.", topic)))?;
            let mut lines = vec![ConsoleLine::plain(
                entry
                    .text
                    .clone()
                    .unwrap_or_else(|| format!("{} - no details.", entry.verbs[0])),
            )];
            if entry.verbs.len() > 1 {
                lines.push(ConsoleLine::new(
                    format!("Also: {}", entry.verbs[1..].join(", ")),
                    "dim",
                ));
            }
            return Ok(Output::Lines(lines));
        }

        let mut lines = vec![ConsoleLine::plain("Commands:")];
        for entry in self.entries() {
            lines.push(ConsoleLine::plain(format!("  {{!b}}{}{{/}}", entry.verbs[0])));
        }
        lines.push(ConsoleLine::new(
            "Type {!b}help <command>{/} for details.",
            "tip",
        ));
        Ok(Output::Lines(lines))
    }

    fn help(&self) -> Option<String> {
        Some("help [command] - list commands, or describe one".to_string())
    }
}
