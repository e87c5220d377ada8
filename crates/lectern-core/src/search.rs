//! Helpers for case-insensitive substring search.

/// Clause appended after every `ILIKE` operand built from [`contains_pattern`].
pub const LIKE_ESCAPE: &str = r" ESCAPE '\'";

/// Escapes LIKE wildcards in user input so it only matches literally.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `%term%` with the term's own wildcards escaped.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_terms_are_wrapped() {
        assert_eq!(contains_pattern("rust"), "%rust%");
    }

    #[test]
    fn test_wildcards_are_escaped() {
        assert_eq!(contains_pattern("%"), r"%\%%");
        assert_eq!(contains_pattern("a_b"), r"%a\_b%");
        assert_eq!(escape_like(r"c:\dir"), r"c:\\dir");
    }
}
