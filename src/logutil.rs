//! Log helpers for raw player input.
//!
//! Everything typed into the input channel ends up in debug logs. Control
//! characters are escaped so one submission is always one log line.

use std::fmt::Write;

/// Longest input preview written to the log.
pub const MAX_PREVIEW: usize = 160;

/// Escape a player-supplied string for single-line logging.
///
/// `\n`, `\r` and `\t` become their escape sequences, a backslash is doubled,
/// other control characters are written as `\xNN`. Input longer than
/// [`MAX_PREVIEW`] characters is cut with an ellipsis.
pub fn escape_log(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_PREVIEW) + 4);
    let mut chars = raw.chars();
    for _ in 0..MAX_PREVIEW {
        let Some(ch) = chars.next() else {
            return out;
        };
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    if chars.next().is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_control_characters() {
        assert_eq!(escape_log("make\n2 rope\t"), "make\\n2 rope\\t");
        assert_eq!(escape_log("a\u{7}b"), "a\\x07b");
    }

    #[test]
    fn truncates_long_input() {
        let long = "g".repeat(MAX_PREVIEW + 10);
        let esc = escape_log(&long);
        assert!(esc.ends_with('…'));
        assert_eq!(esc.chars().count(), MAX_PREVIEW + 1);
    }

    #[test]
    fn exact_length_is_not_truncated() {
        let exact = "s".repeat(MAX_PREVIEW);
        assert_eq!(escape_log(&exact), exact);
    }
}
