#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
#[must_use]
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_input_untouched() {
        assert_eq!(truncate_with_ellipsis("cotton", 10), "cotton");
        assert_eq!(truncate_with_ellipsis("cotton", 6), "cotton");
    }

    #[test]
    fn truncate_trims_before_ellipsis() {
        assert_eq!(
            truncate_with_ellipsis("Is this shirt machine washable?", 14),
            "Is this shirt..."
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_with_ellipsis("naïve café", 4), "naïv...");
        assert_eq!(truncate_with_ellipsis("🧵🧵🧵", 2), "🧵🧵...");
    }

    #[test]
    fn truncate_zero_max_chars() {
        assert_eq!(truncate_with_ellipsis("hello", 0), "...");
    }

    #[test]
    fn normalize_collapses_newlines_and_tabs() {
        assert_eq!(
            normalize_whitespace("  Great\n\tfit,   runs small  "),
            "Great fit, runs small"
        );
        assert_eq!(normalize_whitespace(" \n "), "");
    }
}
