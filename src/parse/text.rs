//! Text normalization helpers.

/// Normalize scraped text for display.
///
/// Non-breaking spaces become ordinary spaces, control characters are
/// dropped, whitespace runs collapse to a single space and the result is
/// trimmed.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        let c = if c == '\u{00A0}' { ' ' } else { c };

        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_control() {
            continue;
        }

        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// First run of ASCII digits in `text`, e.g. 42 for "Cited by 42".
///
/// Returns `None` when there are no digits or the number does not fit a `u32`.
pub fn extract_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_nbsp_and_control() {
        let input = "  Deep\u{00A0}learning \u{0082}  for\t\n farms  ";
        assert_eq!(normalize_text(input), "Deep learning for farms");
    }

    #[test]
    fn test_normalize_isolated_control_char() {
        assert_eq!(normalize_text("a\u{0082}b"), "ab");
        assert_eq!(normalize_text("\u{0082}"), "");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_normalize_keeps_unicode() {
        assert_eq!(normalize_text("Müller, J  –  Ångström"), "Müller, J – Ångström");
    }

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number("Cited by 42"), Some(42));
        assert_eq!(extract_number("All 7 versions"), Some(7));
        assert_eq!(extract_number("Cited by"), None);
        assert_eq!(extract_number("12 of 345"), Some(12));
        assert_eq!(extract_number("Cited by 99999999999999"), None);
    }
}
