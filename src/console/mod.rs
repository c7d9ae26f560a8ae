//! Console output buffer and input channel.
//!
//! Commands and ticking actions write lines through [`Console`]. Lines keep
//! the inline markup syntax `{!class}text{/}` verbatim; turning that into
//! styles is the renderer's job (see [`markup`]). Lines tagged with the
//! `user` class are raw echoes of player input and are never interpreted.
//!
//! Earlier lines can be rewritten in place with [`Console::update_line`],
//! which is how gather found-counters and construction progress bars stay
//! on a single line.
//!
//! When a sink is attached every append, update and prompt change is sent
//! over an unbounded channel on [`Console::flush`], so the binary can print
//! lines produced by background ticks as they happen.

pub mod history;
pub mod input;
pub mod markup;

use std::collections::VecDeque;
use tokio::sync::mpsc;

pub use history::CommandHistory;
pub use input::{InputChannel, Submission};

/// Lines kept for inspection before the oldest are dropped.
const SCROLLBACK: usize = 2000;

/// Stable handle to an appended line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub text: String,
    /// Space separated style classes (`error`, `tip`, `user`, ...).
    pub classes: String,
}

impl ConsoleLine {
    pub fn new(text: impl Into<String>, classes: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            classes: classes.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, "")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.split_whitespace().any(|c| c == class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Append { id: LineId, line: ConsoleLine },
    Update { id: LineId, line: ConsoleLine },
    Prompt(String),
}

#[derive(Debug)]
pub struct Console {
    lines: VecDeque<(LineId, ConsoleLine)>,
    next_id: u64,
    wrap_width: usize,
    pending: Vec<ConsoleEvent>,
    sink: Option<mpsc::UnboundedSender<ConsoleEvent>>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Console {
    pub fn new(wrap_width: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            next_id: 0,
            wrap_width,
            pending: Vec::new(),
            sink: None,
        }
    }

    pub fn attach_sink(&mut self, sink: mpsc::UnboundedSender<ConsoleEvent>) {
        self.sink = Some(sink);
    }

    pub fn append_line(&mut self, text: impl Into<String>, classes: &str) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        let line = ConsoleLine::new(text, classes);
        self.pending.push(ConsoleEvent::Append {
            id,
            line: line.clone(),
        });
        self.lines.push_back((id, line));
        while self.lines.len() > SCROLLBACK {
            self.lines.pop_front();
        }
        id
    }

    /// Word-wrap `text` at the configured width and append each row.
    /// Markup tags do not count towards the width.
    pub fn append(&mut self, text: &str, classes: &str, prefix: &str) {
        let mut line = prefix.to_string();
        for word in text.split_whitespace() {
            let line_len = markup::strip(&line).chars().count();
            let word_len = markup::strip(word).chars().count();
            if line_len + word_len + 1 > self.wrap_width && line.len() > prefix.len() {
                self.append_line(line.trim_end().to_string(), classes);
                line = format!("{}{} ", prefix, word);
            } else {
                line.push_str(word);
                line.push(' ');
            }
        }
        if line.len() > prefix.len() {
            self.append_line(line.trim_end().to_string(), classes);
        }
    }

    /// Replace the text of an earlier line. Lines that already scrolled out
    /// are ignored.
    pub fn update_line(&mut self, id: LineId, text: impl Into<String>) {
        let text = text.into();
        if let Some((_, line)) = self.lines.iter_mut().find(|(lid, _)| *lid == id) {
            line.text = text;
            self.pending.push(ConsoleEvent::Update {
                id,
                line: line.clone(),
            });
        }
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.pending.push(ConsoleEvent::Prompt(prompt.to_string()));
    }

    pub fn line(&self, id: LineId) -> Option<&ConsoleLine> {
        self.lines
            .iter()
            .find(|(lid, _)| *lid == id)
            .map(|(_, line)| line)
    }

    pub fn lines(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter().map(|(_, line)| line)
    }

    /// Text of every buffered line, oldest first.
    pub fn texts(&self) -> Vec<String> {
        self.lines().map(|line| line.text.clone()).collect()
    }

    pub fn last(&self) -> Option<&ConsoleLine> {
        self.lines.back().map(|(_, line)| line)
    }

    /// Send pending events to the sink, if any, and clear them.
    pub fn flush(&mut self) {
        let events = std::mem::take(&mut self.pending);
        let Some(sink) = &self.sink else {
            return;
        };
        let closed = events.into_iter().any(|event| sink.send(event).is_err());
        if closed {
            log::debug!("console sink closed; detaching");
            self.sink = None;
        }
    }
}
