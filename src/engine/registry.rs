//! Registry of commands by name and alias.
//!
//! Commands keep their registration order, which is also the order the
//! processor tries them in. Aliases resolve to the very same `Arc` as the
//! canonical name.

use std::collections::HashMap;
use std::sync::Arc;

use super::command::Command;
use crate::errors::EngineError;

#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
    verbs: Vec<Vec<String>>,
    lookup: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its own name. A second command with the same
    /// name replaces the first in place.
    pub fn add(&mut self, command: Arc<dyn Command>) {
        let name = command.name().to_lowercase();
        if let Some(&idx) = self.lookup.get(&name) {
            log::warn!("command {} registered twice; replacing", name);
            self.commands[idx] = command;
            return;
        }
        self.lookup.insert(name.clone(), self.commands.len());
        self.verbs.push(vec![name]);
        self.commands.push(command);
    }

    /// Add aliases for an already registered command.
    pub fn alias(&mut self, name: &str, aliases: &[&str]) -> Result<(), EngineError> {
        let Some(&idx) = self.lookup.get(&name.to_lowercase()) else {
            return Err(EngineError::UnknownAliasTarget {
                alias: aliases.join(","),
                command: name.to_string(),
            });
        };
        for alias in aliases {
            let alias = alias.to_lowercase();
            match self.lookup.get(&alias) {
                Some(&existing) if existing == idx => continue,
                Some(&existing) => {
                    log::warn!("alias {} rebound to {}", alias, name);
                    self.verbs[existing].retain(|verb| verb != &alias);
                }
                None => {}
            }
            self.lookup.insert(alias.clone(), idx);
            self.verbs[idx].push(alias);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.lookup
            .get(&name.to_lowercase())
            .map(|&idx| Arc::clone(&self.commands[idx]))
    }

    /// Commands with their verbs (name first, then aliases), in
    /// registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<dyn Command>, &[String])> {
        self.commands
            .iter()
            .zip(self.verbs.iter().map(Vec::as_slice))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
