//! Small text formatting helpers shared by the commands.

/// Prefix a noun with "a" or "an".
pub fn with_article(noun: &str) -> String {
    let noun = noun.trim();
    let starts_with_vowel = noun
        .chars()
        .next()
        .map(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
        .unwrap_or(false);
    if starts_with_vowel {
        format!("an {}", noun)
    } else {
        format!("a {}", noun)
    }
}

/// Compact quantity formatting: 950, 1.2k, 3.4M. Fractions keep one decimal.
pub fn format_qty(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if (value - value.round()).abs() < 1e-6 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Text progress bar, e.g. `[#####-----] 50%`.
pub fn progress_bar(current: u64, total: u64, width: usize) -> String {
    let ratio = if total == 0 {
        1.0
    } else {
        (current as f64 / total as f64).clamp(0.0, 1.0)
    };
    let filled = (ratio * width as f64).round() as usize;
    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        (ratio * 100.0).floor() as u32
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles() {
        assert_eq!(with_article("stone axe"), "a stone axe");
        assert_eq!(with_article("Iron pick"), "an Iron pick");
    }

    #[test]
    fn quantities() {
        assert_eq!(format_qty(12.0), "12");
        assert_eq!(format_qty(0.5), "0.5");
        assert_eq!(format_qty(1240.0), "1.2k");
        assert_eq!(format_qty(3_400_000.0), "3.4M");
    }

    #[test]
    fn bars() {
        assert_eq!(progress_bar(5, 10, 10), "[#####-----] 50%");
        assert_eq!(progress_bar(0, 4, 4), "[----] 0%");
        assert_eq!(progress_bar(9, 4, 4), "[####] 100%");
    }
}
