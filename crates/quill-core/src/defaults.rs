//! Centralized default constants for quill.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// RECOGNITION
// =============================================================================

/// Confidence reported for vision-LLM transcriptions. Not derived from the
/// provider response.
pub const VISION_CONFIDENCE: f32 = 0.9;

/// Confidence reported for local OCR results and the enhancement pass.
pub const LOCAL_OCR_CONFIDENCE: f32 = 0.8;

/// Characters the OCR engine may emit.
pub const OCR_CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,'\"-;:!? ";

/// Default OCR language code.
pub const OCR_LANGUAGE: &str = "eng";

/// Default tesseract binary (resolved through PATH).
pub const TESSERACT_BINARY: &str = "tesseract";

/// Timeout for a single OCR engine invocation.
pub const OCR_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// TAGGING & BACKLINKS
// =============================================================================

/// Minimum effective tag length; tags must be strictly longer.
pub const MIN_TAG_LEN: usize = 3;

/// Jaccard score a stored document must strictly exceed to be linked.
pub const BACKLINK_THRESHOLD: f64 = 0.3;

/// Default minimum tag confidence setting.
pub const MIN_TAG_CONFIDENCE: f32 = 0.5;

// =============================================================================
// TITLES
// =============================================================================

/// Title used when nothing better can be derived.
pub const UNTITLED_NOTE: &str = "Untitled Note";

/// Number of leading words used for fallback titles.
pub const TITLE_FALLBACK_WORDS: usize = 4;

/// Maximum characters of a fallback title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Output budget for the title-generation request.
pub const TITLE_MAX_TOKENS: u32 = 20;

// =============================================================================
// LLM PROVIDERS
// =============================================================================

/// Default output token budget for recognition requests.
pub const MAX_TOKENS: u32 = 1000;

/// Request timeout for provider calls.
pub const LLM_TIMEOUT_SECS: u64 = 120;

/// Default OpenAI API endpoint.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default OpenAI vision model.
pub const OPENAI_MODEL: &str = "gpt-4o";

/// Default Anthropic API endpoint.
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com";

/// Default Anthropic vision model.
pub const ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-latest";

/// Anthropic API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// =============================================================================
// STORAGE
// =============================================================================

/// Folder new notes are written to.
pub const OUTPUT_FOLDER: &str = "Handwritten Notes";

/// Folder source images are stored in.
pub const IMAGE_FOLDER: &str = "Handwritten Notes/images";

/// MIME type assumed when magic-byte sniffing fails.
pub const FALLBACK_IMAGE_MIME: &str = "image/png";

/// Extension of note documents.
pub const NOTE_EXTENSION: &str = "md";
