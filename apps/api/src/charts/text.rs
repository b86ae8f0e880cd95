/// Default character limit for collapsed descriptions.
pub const DESCRIPTION_LIMIT: usize = 150;

const ELLIPSIS: &str = "...";

/// Cuts `text` to `limit` characters and appends `...` when it is longer.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
    }
}

/// Whether `text` would be shortened by [`truncate`].
pub fn exceeds(text: &str, limit: usize) -> bool {
    text.chars().nth(limit).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate("hello", DESCRIPTION_LIMIT), "hello");
        assert!(!exceeds("hello", DESCRIPTION_LIMIT));
    }

    #[test]
    fn test_exact_limit_unchanged() {
        let text = "x".repeat(150);
        assert_eq!(truncate(&text, 150), text);
        assert!(!exceeds(&text, 150));
    }

    #[test]
    fn test_long_text_cut_with_ellipsis() {
        let out = truncate(&"a".repeat(200), 150);
        assert_eq!(out.chars().count(), 153);
        assert!(out.ends_with("..."));
        assert!(exceeds(&"a".repeat(200), 150));
    }

    #[test]
    fn test_cuts_on_char_boundary() {
        let out = truncate("åäöåäö", 3);
        assert_eq!(out, "åäö...");
    }
}
