//! Inline style markup: `{!class other}text{/}`.
//!
//! Class names are lowercase letters, digits, spaces and dashes. The plain
//! renderer drops the tags, the ANSI renderer maps known classes to terminal
//! styles. Lines carrying the `user` class are echoed player input and are
//! rendered literally, tags included.

use log::warn;
use regex::Regex;
use std::sync::OnceLock;

use super::ConsoleLine;

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    Plain,
    Ansi,
}

fn open_tag() -> Option<&'static Regex> {
    static OPEN: OnceLock<Option<Regex>> = OnceLock::new();
    OPEN.get_or_init(|| {
        Regex::new(r"\{!([a-z0-9 -]+)\}")
            .map_err(|e| warn!("markup tag pattern failed to compile: {}", e))
            .ok()
    })
    .as_ref()
}

/// Remove all markup tags.
pub fn strip(text: &str) -> String {
    match open_tag() {
        Some(tag) => tag.replace_all(text, "").replace("{/}", ""),
        None => text.replace("{/}", ""),
    }
}

fn ansi_for(classes: &str) -> String {
    classes
        .split_whitespace()
        .filter_map(|class| match class {
            "b" => Some("\x1b[1m"),
            "item" => Some("\x1b[36m"),
            "qty" => Some("\x1b[33m"),
            "tip" => Some("\x1b[32m"),
            "error" => Some("\x1b[31m"),
            "dim" => Some("\x1b[2m"),
            _ => None,
        })
        .collect()
}

/// Render one console line for a terminal.
pub fn render(line: &ConsoleLine, style: RenderStyle) -> String {
    if line.has_class("user") {
        return line.text.clone();
    }
    match style {
        RenderStyle::Plain => strip(&line.text),
        RenderStyle::Ansi => {
            let Some(tag) = open_tag() else {
                return strip(&line.text);
            };
            let base = ansi_for(&line.classes);
            let body = tag.replace_all(&line.text, |caps: &regex::Captures| ansi_for(&caps[1]));
            // closing a span restores the line's own style
            let body = body.replace("{/}", &format!("{}{}", RESET, base));
            if base.is_empty() && body == line.text {
                body
            } else {
                format!("{}{}{}", base, body, RESET)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_removes_tags() {
        assert_eq!(
            strip("Type {!b}stop{/} to finish."),
            "Type stop to finish."
        );
        assert_eq!(strip("{!item big-thing}Kiln{/}"), "Kiln");
    }

    #[test]
    fn tag_pattern_compiles() {
        assert!(open_tag().is_some());
    }

    #[test]
    fn user_lines_render_literally() {
        let line = ConsoleLine::new("$ say {!b}hi{/}", "user");
        assert_eq!(render(&line, RenderStyle::Plain), "$ say {!b}hi{/}");
        assert_eq!(render(&line, RenderStyle::Ansi), "$ say {!b}hi{/}");
    }

    #[test]
    fn ansi_wraps_styled_spans() {
        let line = ConsoleLine::new("{!b}stop{/}", "");
        let out = render(&line, RenderStyle::Ansi);
        assert!(out.starts_with("\x1b[1mstop\x1b[0m"));
        assert!(out.ends_with(RESET));
    }

    #[test]
    fn unstyled_text_is_untouched() {
        let line = ConsoleLine::plain("nothing special");
        assert_eq!(render(&line, RenderStyle::Ansi), "nothing special");
    }
}
