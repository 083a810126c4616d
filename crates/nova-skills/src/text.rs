//! Small text helpers shared by the skills.
//!
//! Trigger phrases are ASCII, so searches lowercase with
//! `to_ascii_lowercase`, which keeps byte offsets valid for slicing the
//! original-case input.

/// Byte offset of `needle` (lowercase ASCII) in `haystack`, ignoring case.
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_ascii_lowercase().find(needle)
}

/// Whether `haystack` contains any of `needles`, ignoring case.
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lowered = haystack.to_ascii_lowercase();
    needles.iter().any(|n| lowered.contains(n))
}

/// The trimmed text after the first occurrence of `keyword`, if non-empty.
pub fn after<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let start = find_ci(text, keyword)? + keyword.len();
    let rest = text[start..].trim_start_matches([':', '-', ' ']).trim();
    (!rest.is_empty()).then_some(rest)
}

/// Like [`after`], dropping a leading connective such as "on" or "about".
pub fn topic_after<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = after(text, keyword)?;
    let lowered = rest.to_ascii_lowercase();
    for connective in ["on ", "about ", "for ", "of ", "to "] {
        if lowered.starts_with(connective) {
            let topic = rest[connective.len()..].trim();
            return (!topic.is_empty()).then_some(topic);
        }
    }
    Some(rest)
}

/// Upper-case the first letter of every word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split prose into sentences on `.`, `!` and `?`.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.len() > 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_keeps_original_case() {
        assert_eq!(after("Deep Research: Quantum Dots", "deep research"), Some("Quantum Dots"));
        assert_eq!(after("deep research", "deep research"), None);
    }

    #[test]
    fn topic_drops_connective() {
        assert_eq!(
            topic_after("flashcards on Machine Learning", "flashcards"),
            Some("Machine Learning")
        );
        assert_eq!(topic_after("quiz chemistry", "quiz"), Some("chemistry"));
    }

    #[test]
    fn title_cases_words() {
        assert_eq!(title_case("machine learning"), "Machine Learning");
    }

    #[test]
    fn splits_sentences() {
        assert_eq!(sentences("One. Two! Three?"), vec!["One.", "Two!", "Three?"]);
    }
}
