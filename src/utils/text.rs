//! Whitespace and label normalisation for scraped text.

use std::sync::LazyLock;

use regex::Regex;

static MIDDLE_DOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[·∙]\s*").unwrap_or_else(|e| panic!("middle dot pattern: {e}"))
});

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes all whitespace (used for label matching).
pub fn remove_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Normalises a filter label: middle dots of either code point, with any
/// surrounding whitespace, become a bare `∙`, and other whitespace collapses.
///
/// `"SUV · RV"` and `"SUV∙RV"` both become `"SUV∙RV"`.
pub fn normalize_label(text: &str) -> String {
    collapse_whitespace(&MIDDLE_DOT.replace_all(text, "∙"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  3만\n  km\t "), "3만 km");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_remove_whitespace() {
        assert_eq!(remove_whitespace(" 헤이딜러 보증\n"), "헤이딜러보증");
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("SUV · RV"), "SUV∙RV");
        assert_eq!(normalize_label("경·소형"), "경∙소형");
        assert_eq!(normalize_label(" 세단 "), "세단");
    }
}
