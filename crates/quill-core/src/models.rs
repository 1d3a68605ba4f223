//! Data model shared by the recognition strategies, the synthesizer and the
//! document stores.

use std::collections::HashSet;
use std::fmt;

use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::{Error, Result};

// =============================================================================
// TAGS
// =============================================================================

/// Insertion-ordered set of tag strings.
///
/// Membership is what matters; the order of first insertion is kept so tags
/// render in the order they were discovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, returning false if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.seen.contains(&tag) {
            return false;
        }
        self.seen.insert(tag.clone());
        self.ordered.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.seen.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

impl FromIterator<String> for TagSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl IntoIterator for TagSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.into_iter()
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.into_vec()
    }
}

// =============================================================================
// RECOGNITION
// =============================================================================

/// Output of a recognition strategy for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
    pub tags: TagSet,
    pub summary: Option<String>,
    pub confidence: f32,
}

impl RecognitionResult {
    /// A plain transcription with no tags or summary.
    pub fn text_only(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            tags: TagSet::new(),
            summary: None,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// OCR page-segmentation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegmentation {
    /// Treat the image as a single uniform block of text.
    SingleBlock,
    /// Treat the image as a single text line.
    SingleLine,
    /// Find as much text as possible in no particular order.
    SparseText,
}

impl PageSegmentation {
    /// The fixed order local recognition tries the modes in.
    pub const PASSES: [PageSegmentation; 3] = [
        PageSegmentation::SingleBlock,
        PageSegmentation::SingleLine,
        PageSegmentation::SparseText,
    ];

    /// Tesseract `--psm` value.
    pub fn psm(self) -> u8 {
        match self {
            Self::SingleBlock => 6,
            Self::SingleLine => 7,
            Self::SparseText => 11,
        }
    }
}

impl fmt::Display for PageSegmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleBlock => write!(f, "single_block"),
            Self::SingleLine => write!(f, "single_line"),
            Self::SparseText => write!(f, "sparse_text"),
        }
    }
}

/// Parameters applied to the OCR engine before each recognition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrParameters {
    pub char_whitelist: String,
    pub page_segmentation: PageSegmentation,
    pub preserve_interword_spaces: bool,
}

impl OcrParameters {
    /// Handwriting defaults for the given segmentation mode.
    pub fn for_mode(page_segmentation: PageSegmentation) -> Self {
        Self {
            char_whitelist: defaults::OCR_CHAR_WHITELIST.to_string(),
            page_segmentation,
            preserve_interword_spaces: true,
        }
    }
}

// =============================================================================
// IMAGE TRANSPORT
// =============================================================================

/// Base64 transport encoding of an image, as sent to vision providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub base64: String,
}

impl ImagePayload {
    /// Encode raw image bytes, sniffing the MIME type from magic bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Validation("image data is empty".to_string()));
        }

        let mime_type = infer::get(data)
            .map(|kind| kind.mime_type())
            .filter(|mime| mime.starts_with("image/"))
            .unwrap_or(defaults::FALLBACK_IMAGE_MIME)
            .to_string();

        let base64 = base64::engine::general_purpose::STANDARD.encode(data);
        if base64.is_empty() {
            return Err(Error::Validation(
                "image could not be encoded for transport".to_string(),
            ));
        }

        Ok(Self { mime_type, base64 })
    }

    /// `data:<mime>;base64,<data>` form used by OpenAI-style APIs.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/bmp" => "bmp",
            "image/tiff" => "tif",
            "image/heif" => "heic",
            _ => "png",
        }
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Reference to a document or asset held by a [`crate::DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Store-relative path, used as the identifier.
    pub id: String,
    /// File name without directory or extension.
    pub basename: String,
}

impl DocumentRef {
    pub fn from_path(path: impl Into<String>) -> Self {
        let id = path.into();
        let file_name = id.rsplit('/').next().unwrap_or(&id);
        let basename = match file_name.rfind('.') {
            Some(idx) if idx > 0 => &file_name[..idx],
            _ => file_name,
        }
        .to_string();
        Self { id, basename }
    }
}

static BLANK_LINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n[ \t\r]*\n(?:[ \t\r]*\n)*").unwrap());

/// Split text into paragraphs on runs of blank lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    BLANK_LINE_RUN
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Markdown body of a synthesized note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteContent {
    pub body: String,
    pub summary: Option<String>,
    pub tags: TagSet,
    /// Basenames of related documents.
    pub related: Vec<String>,
    /// Store path of the source image.
    pub image_path: Option<String>,
}

impl NoteContent {
    /// Render the sections in their fixed order.
    pub fn render(&self) -> String {
        let mut sections = Vec::new();

        let body = paragraphs(&self.body).join("\n\n");
        if !body.is_empty() {
            sections.push(body);
        }

        if let Some(summary) = self.summary.as_deref().map(str::trim) {
            if !summary.is_empty() {
                sections.push(format!("## Summary\n\n{}", summary));
            }
        }

        let tag_line = self
            .tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ");
        sections.push(format!("## Tags\n\n{}", tag_line).trim_end().to_string());

        if !self.related.is_empty() {
            let links = self
                .related
                .iter()
                .map(|name| format!("- [[{}]]", name))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("## Related Notes\n\n{}", links));
        }

        if let Some(ref path) = self.image_path {
            sections.push(format!("![[{}]]", path));
        }

        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }
}
