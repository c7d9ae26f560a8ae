//! Argument patterns for commands.
//!
//! Every command owns an ordered [`PatternSet`]. After the processor has
//! matched the command's verb, the text that follows it is tried against
//! each pattern in declaration order and the first match produces the
//! command's [`Args`]. Patterns are anchored regular expressions; named
//! groups become named arguments and unnamed groups become positional
//! arguments keyed by their group index. The catch-all pattern accepts any
//! text and hands it over whole as positional argument `1`, so it is only
//! allowed as the last pattern of a set.

use regex::Regex;
use std::collections::{BTreeMap, HashMap};

use crate::errors::EngineError;

/// Arguments extracted from one successful pattern match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    named: HashMap<String, String>,
    positional: BTreeMap<usize, String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_named(mut self, name: &str, value: &str) -> Self {
        self.named.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_positional(mut self, index: usize, value: &str) -> Self {
        self.positional.insert(index, value.to_string());
        self
    }

    /// Named capture, `None` when absent or empty.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named
            .get(name)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Positional capture, `None` when absent or empty.
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional
            .get(&index)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Regex(Regex),
    CatchAll,
}

impl Pattern {
    /// Match the full argument text. Returns the extracted arguments.
    pub fn captures(&self, text: &str) -> Option<Args> {
        let text = text.trim();
        match self {
            Pattern::CatchAll => Some(Args::new().with_positional(1, text)),
            Pattern::Regex(re) => {
                let caps = re.captures(text)?;
                let whole = caps.get(0)?;
                if whole.start() != 0 || whole.end() != text.len() {
                    return None;
                }
                let mut args = Args::new();
                for (index, name) in re.capture_names().enumerate().skip(1) {
                    let Some(value) = caps.get(index) else {
                        continue;
                    };
                    match name {
                        Some(name) => {
                            args.named.insert(name.to_string(), value.as_str().to_string());
                        }
                        None => {
                            args.positional.insert(index, value.as_str().to_string());
                        }
                    }
                }
                Some(args)
            }
        }
    }
}

/// Ordered patterns of one command.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Start building the pattern set for `command`.
    pub fn builder(command: &str) -> PatternSetBuilder {
        PatternSetBuilder {
            command: command.to_string(),
            patterns: Vec::new(),
            error: None,
        }
    }

    /// A set holding only the catch-all.
    pub fn catch_all() -> Self {
        Self {
            patterns: vec![Pattern::CatchAll],
        }
    }

    /// First pattern that matches `text`, in declaration order.
    pub fn matches(&self, text: &str) -> Option<Args> {
        self.patterns.iter().find_map(|p| p.captures(text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[derive(Debug)]
pub struct PatternSetBuilder {
    command: String,
    patterns: Vec<Pattern>,
    error: Option<EngineError>,
}

impl PatternSetBuilder {
    /// Add a regular expression. `^`/`$` anchors are implied.
    pub fn regex(mut self, pattern: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let anchored = format!("^(?:{})$", pattern.trim_start_matches('^').trim_end_matches('$'));
        match Regex::new(&anchored) {
            Ok(re) => self.patterns.push(Pattern::Regex(re)),
            Err(source) => {
                self.error = Some(EngineError::Pattern {
                    command: self.command.clone(),
                    source,
                })
            }
        }
        self
    }

    pub fn catch_all(mut self) -> Self {
        self.patterns.push(Pattern::CatchAll);
        self
    }

    pub fn build(self) -> Result<PatternSet, EngineError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let last = self.patterns.len().saturating_sub(1);
        if self
            .patterns
            .iter()
            .enumerate()
            .any(|(i, p)| matches!(p, Pattern::CatchAll) && i != last)
        {
            return Err(EngineError::CatchAllNotLast(self.command));
        }
        Ok(PatternSet {
            patterns: self.patterns,
        })
    }
}
