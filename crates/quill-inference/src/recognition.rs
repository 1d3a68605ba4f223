//! Vision-LLM recognition and title generation.

use tracing::{debug, instrument};

use quill_core::{defaults, ImagePayload, QuillConfig, RecognitionResult, Result, TagSet};

use crate::prompts::{recognition_prompt, title_prompt};
use crate::response::parse_structured_response;
use crate::vision::VisionBackend;

/// Toggles for a vision recognition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisionOptions {
    pub suggest_tags: bool,
    pub summarize: bool,
    pub max_tokens: u32,
}

impl Default for VisionOptions {
    fn default() -> Self {
        Self {
            suggest_tags: true,
            summarize: false,
            max_tokens: defaults::MAX_TOKENS,
        }
    }
}

impl From<&QuillConfig> for VisionOptions {
    fn from(config: &QuillConfig) -> Self {
        Self {
            suggest_tags: config.suggest_tags,
            summarize: config.summarize,
            max_tokens: config.max_tokens,
        }
    }
}

/// Transcribe an image with a vision LLM in one request.
///
/// Tags come back lowercased and trimmed but not yet in tag form; the
/// synthesizer formats them. Confidence is fixed at
/// [`defaults::VISION_CONFIDENCE`].
#[instrument(
    skip(backend, image),
    fields(provider = %backend.provider(), model = backend.model_name())
)]
pub async fn recognize_vision(
    backend: &dyn VisionBackend,
    image: &ImagePayload,
    options: &VisionOptions,
) -> Result<RecognitionResult> {
    let prompt = recognition_prompt(options.suggest_tags, options.summarize);
    let raw = backend
        .complete_with_image(image, &prompt, options.max_tokens)
        .await?;

    let parsed = parse_structured_response(&raw);
    debug!(
        text_len = parsed.text.len(),
        tags = parsed.tags.len(),
        has_summary = parsed.summary.is_some(),
        "Parsed vision response"
    );

    Ok(RecognitionResult {
        text: parsed.text,
        tags: TagSet::from(parsed.tags),
        summary: parsed.summary,
        confidence: defaults::VISION_CONFIDENCE,
    })
}

/// Ask the LLM for a short note title. Returns the trimmed response.
pub async fn generate_title(backend: &dyn VisionBackend, text: &str) -> Result<String> {
    let title = backend
        .complete(&title_prompt(text), defaults::TITLE_MAX_TOKENS)
        .await?;
    Ok(title.trim().to_string())
}
