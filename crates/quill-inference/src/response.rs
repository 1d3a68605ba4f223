//! Parsing of `TEXT:` / `TAGS:` / `SUMMARY:` structured responses.

use quill_core::paragraphs;

use crate::prompts::{SUMMARY_PREFIX, TAGS_PREFIX, TEXT_PREFIX};

/// Sections recovered from a structured vision response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredResponse {
    pub text: String,
    pub tags: Vec<String>,
    pub summary: Option<String>,
}

/// Split the response on blank lines and assign blocks to sections by prefix.
///
/// The first block with a given prefix wins; blocks with no known prefix are
/// ignored. A missing `TEXT:` block yields empty text.
pub fn parse_structured_response(raw: &str) -> StructuredResponse {
    let mut text = None;
    let mut tags = None;
    let mut summary = None;

    for block in paragraphs(raw) {
        if let Some(rest) = block.strip_prefix(TEXT_PREFIX) {
            text.get_or_insert_with(|| rest.trim().to_string());
        } else if let Some(rest) = block.strip_prefix(TAGS_PREFIX) {
            tags.get_or_insert_with(|| parse_tag_list(rest));
        } else if let Some(rest) = block.strip_prefix(SUMMARY_PREFIX) {
            summary.get_or_insert_with(|| rest.trim().to_string());
        }
    }

    StructuredResponse {
        text: text.unwrap_or_default(),
        tags: tags.unwrap_or_default(),
        summary: summary.filter(|s| !s.is_empty()),
    }
}

fn parse_tag_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sections() {
        let parsed = parse_structured_response(
            "TEXT:\nHello world\n\nTAGS:\ngreeting, demo\n\nSUMMARY:\nA greeting.",
        );
        assert_eq!(parsed.text, "Hello world");
        assert_eq!(parsed.tags, vec!["greeting", "demo"]);
        assert_eq!(parsed.summary.as_deref(), Some("A greeting."));
    }

    #[test]
    fn test_text_only() {
        let parsed = parse_structured_response("TEXT:\nJust the words");
        assert_eq!(parsed.text, "Just the words");
        assert!(parsed.tags.is_empty());
        assert!(parsed.summary.is_none());
    }

    #[test]
    fn test_inline_prefix_and_crlf() {
        let parsed = parse_structured_response("TEXT: inline text\r\n\r\nTAGS: A,  B b ,,");
        assert_eq!(parsed.text, "inline text");
        assert_eq!(parsed.tags, vec!["a", "b b"]);
    }

    #[test]
    fn test_first_block_per_prefix_wins() {
        let parsed = parse_structured_response(
            "TEXT:\nfirst\n\nTEXT:\nsecond\n\nSUMMARY:\none\n\nSUMMARY:\ntwo",
        );
        assert_eq!(parsed.text, "first");
        assert_eq!(parsed.summary.as_deref(), Some("one"));
    }

    #[test]
    fn test_unmatched_blocks_ignored() {
        let parsed =
            parse_structured_response("Sure, here it is:\n\nTEXT:\nnote\n\nHope that helps");
        assert_eq!(parsed.text, "note");
        assert!(parsed.tags.is_empty());
    }

    #[test]
    fn test_missing_text_block() {
        let parsed = parse_structured_response("I cannot read this image.");
        assert_eq!(parsed, StructuredResponse::default());
    }
}
