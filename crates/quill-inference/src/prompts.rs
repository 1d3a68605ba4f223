//! Prompt builders for handwriting recognition and note titles.

/// Prefix of the transcription section in a structured response.
pub const TEXT_PREFIX: &str = "TEXT:";
/// Prefix of the comma-separated tag section.
pub const TAGS_PREFIX: &str = "TAGS:";
/// Prefix of the summary section.
pub const SUMMARY_PREFIX: &str = "SUMMARY:";

/// Build the recognition prompt.
///
/// Always asks for a transcription; tags and summary are requested per the
/// toggles. The response format section lists only the requested sections.
pub fn recognition_prompt(suggest_tags: bool, summarize: bool) -> String {
    let mut prompt = String::from(
        "Transcribe the handwritten text in this image exactly as written. \
         Preserve line breaks and paragraphs. Do not add commentary.",
    );

    if suggest_tags {
        prompt.push_str(
            "\nAlso suggest 3-5 short topical tags for the content, as a comma-separated list.",
        );
    }
    if summarize {
        prompt.push_str("\nAlso write a one or two sentence summary of the content.");
    }

    prompt.push_str(
        "\n\nRespond in exactly this format, with a blank line between sections:\n\n",
    );
    prompt.push_str(TEXT_PREFIX);
    prompt.push_str("\n<transcribed text>");
    if suggest_tags {
        prompt.push_str("\n\n");
        prompt.push_str(TAGS_PREFIX);
        prompt.push_str("\n<tag1, tag2, tag3>");
    }
    if summarize {
        prompt.push_str("\n\n");
        prompt.push_str(SUMMARY_PREFIX);
        prompt.push_str("\n<summary>");
    }

    prompt
}

/// Build the note title prompt for already-recognized text.
pub fn title_prompt(text: &str) -> String {
    format!(
        "Generate a short title of 3-4 words for the following note. \
         Respond with the title only, without quotes or punctuation.\n\n{}",
        text
    )
}
