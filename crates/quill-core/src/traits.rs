//! Capability traits the pipeline reaches external systems through.

use async_trait::async_trait;

use crate::models::{DocumentRef, OcrParameters};
use crate::Result;

// =============================================================================
// OCR ENGINE
// =============================================================================

/// A stateful OCR engine.
///
/// Callers apply parameters with [`OcrEngine::set_parameters`] and then call
/// [`OcrEngine::recognize`]; the two calls must not be interleaved with
/// another caller's. Lifecycle and serialization are handled by the
/// pipeline's worker wrapper, not by implementations.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Load the engine for the given language code (e.g. `eng`, `eng+deu`).
    async fn initialize(&self, language: &str) -> Result<()>;

    /// Apply recognition parameters for subsequent calls.
    async fn set_parameters(&self, params: &OcrParameters) -> Result<()>;

    /// Recognize text in an encoded image.
    async fn recognize(&self, image: &[u8]) -> Result<String>;

    /// Release engine resources.
    async fn terminate(&self) -> Result<()>;

    /// Engine name for logging.
    fn name(&self) -> &str;
}

// =============================================================================
// DOCUMENT STORE
// =============================================================================

/// Storage for notes and their binary assets.
///
/// Paths are store-relative and use `/` as separator.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Enumerate text documents in a stable order.
    async fn list_documents(&self) -> Result<Vec<DocumentRef>>;

    /// Read a document's full text.
    async fn read_text(&self, id: &str) -> Result<String>;

    /// Create a new text document. Fails if one already exists at `path`.
    async fn create_document(&self, path: &str, content: &str) -> Result<DocumentRef>;

    /// Delete the document or asset at `path` if present.
    async fn delete_if_exists(&self, path: &str) -> Result<()>;

    /// Create a folder (and its parents) if missing.
    async fn create_folder_if_missing(&self, path: &str) -> Result<()>;

    /// Create a binary asset. Fails if one already exists at `path`.
    async fn create_binary(&self, path: &str, data: &[u8]) -> Result<DocumentRef>;

    /// Move an existing document or asset to `new_path`.
    async fn rename_or_move(&self, id: &str, new_path: &str) -> Result<DocumentRef>;
}
