use log::debug;

use super::command::RunResult;
use super::registry::CommandRegistry;
use crate::logutil::escape_log;
use crate::world::GameContext;

/// Routes raw input to the first command that claims it.
///
/// Commands are tried in registration order. A command claims the input when
/// its first word is one of the command's verbs and the remaining text
/// matches one of its patterns; otherwise the next command is tried.
#[derive(Clone, Default)]
pub struct CommandProcessor {
    registry: CommandRegistry,
}

impl CommandProcessor {
    pub fn new(registry: CommandRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run `raw` against the registered commands. `None` means no command
    /// claimed it.
    pub fn run(&self, ctx: &mut GameContext, raw: &str) -> Option<RunResult> {
        let input = raw.trim();
        let (verb, rest) = match input.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (input, ""),
        };
        if verb.is_empty() {
            return None;
        }
        let verb = verb.to_lowercase();

        for (command, verbs) in self.registry.iter() {
            if !verbs.iter().any(|v| *v == verb) {
                continue;
            }
            if let Some(args) = command.patterns().matches(rest) {
                debug!(
                    "dispatch: command={} input={}",
                    command.name(),
                    escape_log(input)
                );
                return Some(command.run(ctx, &args));
            }
        }
        debug!("dispatch: unhandled input={}", escape_log(input));
        None
    }
}
