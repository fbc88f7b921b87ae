//! Text helpers shared by the extractors: word-boundary term search and snippets.
//!
//! Terms such as `c++`, `node.js` or `ci/cd` contain non-word characters, so a
//! plain `\b` regex cannot express their boundaries. Occurrences are found with
//! substring search and accepted when the neighbouring characters are not
//! alphanumeric.

/// Byte offsets of every word-bounded occurrence of `term` in `haystack`.
/// Both inputs are expected to be lower-case already.
pub fn term_positions(haystack: &str, term: &str) -> Vec<usize> {
    if term.is_empty() {
        return Vec::new();
    }

    haystack
        .match_indices(term)
        .filter(|(start, _)| is_bounded(haystack, *start, *start + term.len()))
        .map(|(start, _)| start)
        .collect()
}

pub fn count_term(haystack: &str, term: &str) -> usize {
    term_positions(haystack, term).len()
}

pub fn contains_term(haystack: &str, term: &str) -> bool {
    !term_positions(haystack, term).is_empty()
}

/// A term glued to a preceding `word.` is a suffix (`js` in `node.js`), not a word.
fn is_bounded(haystack: &str, start: usize, end: usize) -> bool {
    let prefix = &haystack[..start];
    let before = prefix.chars().next_back();
    let after = haystack[end..].chars().next();
    let dotted_suffix = prefix
        .strip_suffix('.')
        .and_then(|rest| rest.chars().next_back())
        .is_some_and(is_word_char);
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char) && !dotted_suffix
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Text surrounding `[start, start + len)`, widened by `radius` bytes on both
/// sides and snapped to char boundaries.
pub fn window(text: &str, start: usize, len: usize, radius: usize) -> &str {
    let mut from = start.saturating_sub(radius);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (start + len + radius).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    &text[from..to]
}

/// Collapses whitespace so snippets read as a single line.
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Order-preserving de-duplication, case-insensitive.
pub fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

/// Rounds to four decimals so serialized weights stay readable and stable.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_positions_respects_word_boundaries() {
        let text = "java and javascript, java.";
        assert_eq!(term_positions(text, "java"), vec![0, 21]);
        assert_eq!(count_term(text, "javascript"), 1);
    }

    #[test]
    fn test_symbol_terms_match() {
        assert!(contains_term("strong c++ and ci/cd skills", "c++"));
        assert!(contains_term("strong c++ and ci/cd skills", "ci/cd"));
        assert!(contains_term("we use node.js daily", "node.js"));
        assert!(!contains_term("cppc++x", "c++"));
    }

    #[test]
    fn test_dotted_suffix_is_not_a_word() {
        assert!(!contains_term("backend services in node.js", "js"));
        assert!(!contains_term("react.js and vue.js", "js"));
        assert!(contains_term("plain js. and ts", "js"));
        assert!(contains_term("written in node.js", "node"));
        assert!(contains_term("asp and .net core", ".net"));
    }

    #[test]
    fn test_empty_term_never_matches() {
        assert!(term_positions("anything", "").is_empty());
    }

    #[test]
    fn test_window_snaps_to_char_boundaries() {
        let text = "Müller built über-fast systems";
        let pos = text.find("built").unwrap();
        let w = window(text, pos, 5, 3);
        assert!(w.contains("built"));
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let items = vec!["Rust".to_string(), "rust".to_string(), "Go".to_string()];
        assert_eq!(dedup_preserving_order(items), vec!["Rust", "Go"]);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
    }
}
