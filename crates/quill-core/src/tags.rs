//! Lexical tag extraction and tag formatting.
//!
//! Tags are derived without any NLP: candidate words are long-enough,
//! non-stopword tokens, and candidate phrases are sliding windows of one to
//! three consecutive tokens. Every candidate goes through [`normalize_tag`].

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::defaults::MIN_TAG_LEN;
use crate::models::TagSet;

/// Common English words that never become single-word tags.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old",
    "see", "two", "way", "who", "boy", "did", "its", "let", "put", "say", "she", "too", "use",
    "that", "with", "have", "this", "will", "your", "from", "they", "know", "want", "been",
    "good", "much", "some", "time", "very", "when", "come", "here", "just", "like", "long",
    "make", "many", "over", "such", "take", "than", "them", "well", "were", "what", "where",
    "which", "while", "would", "there", "their", "these", "those", "about", "after", "again",
    "could", "every", "other", "should", "being", "into", "only", "also", "then", "because",
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

/// Whether `word` is in the stopword list (case-insensitive).
pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word.to_lowercase().as_str())
}

/// Normalize a candidate into tag form.
///
/// Lowercases, turns space runs into single hyphens, strips everything
/// outside `[a-z0-9-]`, and collapses/trims hyphens. Returns `None` when the
/// result is not longer than [`MIN_TAG_LEN`].
pub fn normalize_tag(candidate: &str) -> Option<String> {
    let lowered = candidate.to_lowercase();
    let hyphenated = lowered
        .split(' ')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let filtered: String = hyphenated
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    let tag = filtered
        .split('-')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if tag.len() > MIN_TAG_LEN {
        Some(tag)
    } else {
        None
    }
}

/// Normalize externally supplied tags, dropping ones that do not survive.
pub fn format_tags<I, S>(tags: I) -> TagSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|t| normalize_tag(t.as_ref()))
        .collect()
}

/// Lowercase alphanumeric tokens longer than [`MIN_TAG_LEN`], in text order.
fn candidate_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|token| token.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|token| token.chars().count() > MIN_TAG_LEN)
        .collect()
}

/// Derive tags from normalized note text.
///
/// Used when no LLM-provided tags exist. Never fails; empty input yields an
/// empty set.
pub fn extract_tags(text: &str) -> TagSet {
    let tokens = candidate_tokens(text);
    let mut tags = TagSet::new();

    for i in 0..tokens.len() {
        for width in 1..=3 {
            if i + width > tokens.len() {
                break;
            }
            let phrase = tokens[i..i + width].join(" ");
            let Some(tag) = normalize_tag(&phrase) else {
                continue;
            };
            if width == 1 && is_stopword(&tag) {
                continue;
            }
            tags.insert(tag);
        }
    }

    for token in &tokens {
        if is_stopword(token) {
            continue;
        }
        if let Some(tag) = normalize_tag(token) {
            tags.insert(tag);
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn assert_tag_format(tag: &str) {
        let pattern = Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap();
        assert!(pattern.is_match(tag), "bad tag format: {:?}", tag);
        assert!(tag.len() > 3, "tag too short: {:?}", tag);
    }

    #[test]
    fn test_stopword_list_size() {
        assert!((85..=100).contains(&STOPWORDS.len()));
        assert!(is_stopword("THE"));
        assert!(is_stopword("Which"));
        assert!(!is_stopword("milk"));
    }

    #[test]
    fn test_normalize_tag_rules() {
        assert_eq!(normalize_tag("Project  Alpha"), Some("project-alpha".to_string()));
        assert_eq!(normalize_tag("--weird--tag--"), Some("weird-tag".to_string()));
        assert_eq!(normalize_tag("C++ & Rust!"), Some("c-rust".to_string()));
        assert_eq!(normalize_tag("a - b"), None);
        assert_eq!(normalize_tag("abc"), None);
        assert_eq!(normalize_tag("abcd"), Some("abcd".to_string()));
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn test_format_tags_drops_invalid() {
        let tags = format_tags(["Greeting", "demo", "Meeting Notes", "x"]);
        assert_eq!(tags.into_vec(), vec!["greeting", "demo", "meeting-notes"]);
    }

    #[test]
    fn test_extract_tags_grocery_line() {
        let tags = extract_tags("Buy milk and eggs tomorrow");
        assert!(tags.contains("milk"));
        assert!(tags.contains("eggs"));
        assert!(tags.contains("tomorrow"));
        assert!(tags.contains("milk-eggs"));
        assert!(tags.contains("milk-eggs-tomorrow"));
        assert!(tags.contains("eggs-tomorrow"));
        assert!(!tags.contains("and"));
        assert!(!tags.contains("buy"));
        assert_eq!(tags.len(), 6);
    }

    #[test]
    fn test_extract_tags_skips_single_stopwords_but_keeps_phrases() {
        let tags = extract_tags("meeting about budget");
        assert!(!tags.contains("about"));
        assert!(tags.contains("meeting-about"));
        assert!(tags.contains("about-budget"));
        assert!(tags.contains("meeting-about-budget"));
        assert!(tags.contains("meeting"));
        assert!(tags.contains("budget"));
    }

    #[test]
    fn test_extract_tags_strips_punctuation() {
        let tags = extract_tags("Project: deadline, (friday)!");
        assert!(tags.contains("project"));
        assert!(tags.contains("deadline"));
        assert!(tags.contains("friday"));
    }

    #[test]
    fn test_extract_tags_empty_input() {
        assert!(extract_tags("").is_empty());
        assert!(extract_tags("a an to be").is_empty());
    }

    #[test]
    fn test_extracted_tags_match_format() {
        let samples = [
            "Buy milk and eggs tomorrow",
            "Call Dr. O'Brien re: the 2nd appointment -- urgent!!",
            "naïve café résumé über",
            "alpha-beta gamma_delta 1234 5678",
        ];
        for sample in samples {
            for tag in extract_tags(sample).iter() {
                assert_tag_format(tag);
            }
        }
        for tag in format_tags(["  Mixed CASE tag ", "under_score", "ok-tag-"]).iter() {
            assert_tag_format(tag);
        }
    }
}
