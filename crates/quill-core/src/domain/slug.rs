//! URL-safe slugs that keep non-ASCII letters intact.

use std::sync::LazyLock;

use regex::Regex;

/// Characters that are neither word characters, whitespace nor hyphens.
static DISALLOWED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s-]").expect("fail to create a regex for disallowed slug characters")
});

/// Runs of whitespace and hyphens.
static SEPARATOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-\s]+").expect("fail to create a regex for slug separators")
});

/// Converts a display name into a slug.
///
/// Word characters of any script are preserved, so `"여행 일기"` becomes
/// `"여행-일기"` rather than an empty string.
pub fn slugify(name: &str) -> String {
    let cleaned = DISALLOWED_PATTERN.replace_all(name, "");
    let lowered = cleaned.to_lowercase();
    let joined = SEPARATOR_PATTERN.replace_all(&lowered, "-");
    joined.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn test_ascii_names() {
        assert_eq!(slugify("Travel"), "travel");
        assert_eq!(slugify("Rust Lang"), "rust-lang");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("a - b"), "a-b");
    }

    #[test]
    fn test_unicode_is_preserved() {
        assert_eq!(slugify("여행 일기"), "여행-일기");
        assert_eq!(slugify("Café Crème"), "café-crème");
    }

    #[test]
    fn test_edges_are_trimmed() {
        assert_eq!(slugify("_under_score_"), "under_score");
        assert_eq!(slugify("--dash--"), "dash");
        assert_eq!(slugify("!!!"), "");
    }
}
