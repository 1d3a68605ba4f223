//! Cleanup of raw OCR output.
//!
//! OCR on handwriting produces stuttered punctuation, vertical bars for
//! capital I, and digit/letter confusions. [`normalize`] repairs these with a
//! fixed sequence of passes:
//!
//! 1. collapse runs of a repeated `. , ! ? ; :` to one mark
//! 2. `|` becomes `I`
//! 3. `1`, `I` and `l` all become `l`
//! 4. `0` and `O` become `o`
//! 5. drop anything outside printable ASCII (newlines survive this pass)
//! 6. collapse whitespace runs to one space
//! 7. trim
//!
//! Steps 3 and 4 lose information (a real `10` becomes `lo`). The function
//! is pure and idempotent.

const COLLAPSIBLE_PUNCTUATION: [char; 6] = ['.', ',', '!', '?', ';', ':'];

/// Normalize raw OCR text.
pub fn normalize(raw: &str) -> String {
    let collapsed = collapse_repeated_punctuation(raw);

    let repaired: String = collapsed
        .chars()
        .map(|c| match c {
            '|' => 'I',
            other => other,
        })
        .map(|c| match c {
            '1' | 'I' | 'l' => 'l',
            other => other,
        })
        .map(|c| match c {
            '0' | 'O' => 'o',
            other => other,
        })
        .collect();

    let printable: String = repaired
        .chars()
        .filter(|&c| c == '\n' || (' '..='~').contains(&c))
        .collect();
    // Stripping can bring two identical marks together ("!\u{7f}!").
    let printable = collapse_repeated_punctuation(&printable);

    printable.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collapse_repeated_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if COLLAPSIBLE_PUNCTUATION.contains(&c) && previous == Some(c) {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

/// Number of whitespace-separated words in the trimmed text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_repeated_punctuation() {
        assert_eq!(normalize("Wait... what?!?? yes;; no::"), "Wait. what?!? yes; no:");
    }

    #[test]
    fn test_vertical_bar_becomes_lowercase_l() {
        // `|` -> `I` -> `l`
        assert_eq!(normalize("|t is"), "lt is");
    }

    #[test]
    fn test_character_confusion_repair_is_lossy() {
        assert_eq!(normalize("I filed 10 OLD forms"), "l filed lo oLD forms");
    }

    #[test]
    fn test_strips_non_printable_and_non_ascii() {
        assert_eq!(normalize("caf\u{e9} na\u{ef}ve\u{7}"), "caf nave");
    }

    #[test]
    fn test_tabs_are_stripped_and_join_words() {
        assert_eq!(
            normalize("  first   line\n\nsecond\tline  "),
            "first line secondline"
        );
    }

    #[test]
    fn test_newline_between_words_becomes_space() {
        assert_eq!(normalize("first\nline"), "first line");
        assert_eq!(normalize("one\n\n\ntwo"), "one two");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(
            normalize("Buy milk and eggs tomorrow"),
            "Buy milk and eggs tomorrow"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "",
            "Buy milk and eggs tomorrow",
            "Wait... what?!??",
            "!\u{7f}!",
            ".\u{e9}.\u{e9}.",
            "|||| 1lI 0O",
            "tabs\tand\nnewlines\r\n\r\nhere",
            "  ;;  ::  ,, ",
            "\u{2014} em dash \u{2014}",
            "ABC|def|123|OOO|000",
            "?\n?",
            "end..\u{301}.",
        ];
        for input in inputs {
            let once = normalize(input);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\nthree  "), 3);
        assert_eq!(word_count("   "), 0);
    }
}
