//! Stable failure signatures for deduplication.
//!
//! A signature is the sole deduplication key, so extraction must be pure and
//! deterministic: the same text always yields the same signature. Heuristics
//! are tried in order — an explicit `Error:` line, a locator-wait pattern,
//! then the first non-empty line.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum signature length in characters.
pub const MAX_SIGNATURE_LEN: usize = 180;

/// Trailing parenthesized suffix such as " (retrying 2/3)".
fn trailing_paren_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+\(.*?\)$").expect("valid paren regex"))
}

fn locator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)waiting for locator\((.+?)\)").expect("valid locator regex"))
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Extract a short stable signature from a failure text block.
///
/// The result is never empty for non-empty input and never exceeds
/// [`MAX_SIGNATURE_LEN`] characters.
pub fn extract_signature(text: &str) -> String {
    let lines: Vec<&str> = text
        .trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    for line in &lines {
        if line.to_lowercase().starts_with("error:") {
            let stripped = trailing_paren_re().replace(line, "");
            return truncate_chars(&stripped, MAX_SIGNATURE_LEN);
        }
    }

    for line in &lines {
        if let Some(caps) = locator_re().captures(line) {
            let sig = format!("Timeout waiting for locator({})", &caps[1]);
            return truncate_chars(&sig, MAX_SIGNATURE_LEN);
        }
    }

    let fallback = lines.first().copied().unwrap_or(text);
    truncate_chars(fallback, MAX_SIGNATURE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_line_strips_trailing_parenthetical() {
        let sig = extract_signature("Error: Timeout 30000ms exceeded (retrying 2/3)");
        assert_eq!(sig, "Error: Timeout 30000ms exceeded");
    }

    #[test]
    fn test_error_line_found_below_noise() {
        let text = "cart smoke suite\nError: cart badge count mismatch\nat cart.spec.ts:42";
        assert_eq!(extract_signature(text), "Error: cart badge count mismatch");
    }

    #[test]
    fn test_error_prefix_is_case_insensitive() {
        assert_eq!(
            extract_signature("ERROR: checkout button missing"),
            "ERROR: checkout button missing"
        );
    }

    #[test]
    fn test_locator_pattern_synthesizes_signature() {
        let text = "Test timeout of 30000ms exceeded while waiting for locator('.cart-item')";
        assert_eq!(
            extract_signature(text),
            "Timeout waiting for locator('.cart-item')"
        );
    }

    #[test]
    fn test_error_rule_wins_over_locator_rule() {
        let text = "Error: strict check failed\nwaiting for locator('.cart-item')";
        assert_eq!(extract_signature(text), "Error: strict check failed");
    }

    #[test]
    fn test_fallback_uses_first_non_empty_line() {
        let text = "\n\n  cart subtotal incorrect  \nsecond line";
        assert_eq!(extract_signature(text), "cart subtotal incorrect");
    }

    #[test]
    fn test_whitespace_only_input_falls_back_to_original() {
        assert_eq!(extract_signature("   "), "   ");
    }

    #[test]
    fn test_signature_is_bounded() {
        let long = format!("Error: {}", "x".repeat(500));
        assert!(extract_signature(&long).chars().count() <= MAX_SIGNATURE_LEN);

        let long_locator = format!("waiting for locator('{}')", "y".repeat(500));
        assert!(extract_signature(&long_locator).chars().count() <= MAX_SIGNATURE_LEN);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let text = "Error: flaky cart assertion (attempt 1)";
        assert_eq!(extract_signature(text), extract_signature(text));
    }
}
