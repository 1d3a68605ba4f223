//! Note synthesis: one handwriting image in, one markdown note out.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use quill_core::defaults::{NOTE_EXTENSION, TITLE_FALLBACK_WORDS, TITLE_MAX_CHARS, UNTITLED_NOTE};
use quill_core::{
    extract_tags, find_related_notes, format_tags, DocumentRef, DocumentStore, Error,
    ImagePayload, NoteContent, QuillConfig, Result,
};
use quill_inference::{build_backend, generate_title, VisionBackend};

use crate::ocr::{OcrWorker, TesseractEngine};
use crate::recognition::RecognitionStrategy;

/// Suffix for a note set aside while its replacement is written.
const REPLACED_NOTE_SUFFIX: &str = "replaced";

/// Characters that may not appear in a note file name.
const FORBIDDEN_TITLE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// One image to turn into a note.
#[derive(Debug, Clone, Default)]
pub struct SynthesisInput {
    /// Encoded image bytes.
    pub image: Vec<u8>,
    /// Original file name; used for the stored image.
    pub file_name: Option<String>,
    /// Store id of an existing asset holding the image. It is moved into the
    /// image folder instead of being written again.
    pub source_id: Option<String>,
}

impl SynthesisInput {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            ..Default::default()
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

/// Orchestrates recognition, tagging, backlinking, and persistence.
///
/// Runs are serialized: a second call waits until the first note is written.
pub struct NoteSynthesizer {
    config: QuillConfig,
    store: Arc<dyn DocumentStore>,
    ocr: Arc<OcrWorker>,
    backend: Option<Arc<dyn VisionBackend>>,
    run_lock: Mutex<()>,
}

impl NoteSynthesizer {
    /// Create a synthesizer from its parts. `backend` is the configured
    /// vision provider, if any.
    pub fn new(
        config: QuillConfig,
        store: Arc<dyn DocumentStore>,
        ocr: Arc<OcrWorker>,
        backend: Option<Arc<dyn VisionBackend>>,
    ) -> Self {
        Self {
            config,
            store,
            ocr,
            backend,
            run_lock: Mutex::new(()),
        }
    }

    /// Build the tesseract worker and the configured provider from `config`.
    ///
    /// The OCR engine is initialized unless vision recognition is selected.
    pub async fn from_config(config: QuillConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let backend = build_backend(&config)?;
        let ocr = Arc::new(OcrWorker::new(Arc::new(TesseractEngine::new(
            config.tesseract_path.clone(),
        ))));

        if !config.use_vision_for_ocr {
            ocr.initialize(&config.ocr_language).await?;
        }

        info!(
            provider = %config.llm_provider,
            vision = config.use_vision_for_ocr,
            provider_configured = backend.is_some(),
            "Note synthesizer ready"
        );
        Ok(Self::new(config, store, ocr, backend))
    }

    pub fn config(&self) -> &QuillConfig {
        &self.config
    }

    /// Release the OCR engine. Waits for an in-flight recognition.
    pub async fn shutdown(&self) -> Result<()> {
        self.ocr.terminate().await
    }

    /// Turn one image into a stored note and return the note's reference.
    ///
    /// Every failure is wrapped in [`Error::Processing`] and logged once.
    pub async fn synthesize(&self, input: SynthesisInput) -> Result<DocumentRef> {
        let _run = self.run_lock.lock().await;

        match self.run(&input).await {
            Ok(note) => {
                info!(note = %note.id, "Created note from handwriting");
                Ok(note)
            }
            Err(e) => {
                let e = e.processing();
                error!(error = %e, file = ?input.file_name, "Note synthesis failed");
                Err(e)
            }
        }
    }

    /// Read an image from disk and synthesize it, keeping its file name.
    pub async fn process_file(&self, path: &Path) -> Result<DocumentRef> {
        let image = match tokio::fs::read(path).await {
            Ok(image) => image,
            Err(e) => {
                let e = Error::from(e).processing();
                error!(error = %e, path = %path.display(), "Failed to read image");
                return Err(e);
            }
        };

        let mut input = SynthesisInput::new(image);
        input.file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        self.synthesize(input).await
    }

    #[instrument(skip(self, input), fields(bytes = input.image.len()))]
    async fn run(&self, input: &SynthesisInput) -> Result<DocumentRef> {
        if input.image.is_empty() {
            return Err(Error::Validation("image data is empty".to_string()));
        }
        let payload = ImagePayload::from_bytes(&input.image)?;

        let strategy =
            RecognitionStrategy::select(&self.config, self.ocr.clone(), self.backend.clone())?;
        debug!(strategy = strategy.name(), mime = %payload.mime_type, "Recognizing image");
        let recognition = strategy.recognize(&input.image, &payload).await?;

        let text = recognition.text.trim().to_string();
        if text.is_empty() {
            return Err(Error::Validation("no text recognized in image".to_string()));
        }

        let raw_tags = if recognition.tags.is_empty() {
            extract_tags(&text)
        } else {
            recognition.tags
        };

        let title = self.title(&text).await;
        let note_path = self.note_path(&title);
        let tags = format_tags(raw_tags);
        let related: Vec<DocumentRef> = if self.config.auto_backlink {
            // Skip the note this run replaces.
            find_related_notes(&text, self.store.as_ref())
                .await?
                .into_iter()
                .filter(|doc| doc.id != note_path)
                .collect()
        } else {
            Vec::new()
        };
        debug!(%title, tags = tags.len(), related = related.len(), "Note assembled");

        let image_path = self.image_path(input, &payload);
        let content = NoteContent {
            body: text,
            summary: recognition.summary,
            tags,
            related: related.into_iter().map(|doc| doc.basename).collect(),
            image_path: Some(image_path.clone()),
        };

        let pending = self.write_note(&note_path, &content.render()).await?;
        if let Err(e) = self.store_image(input, &image_path).await {
            self.rollback(pending).await;
            return Err(e);
        }
        Ok(self.commit(pending).await)
    }

    /// LLM title when a provider is configured, first words otherwise.
    async fn title(&self, text: &str) -> String {
        let Some(backend) = self.backend.as_deref() else {
            return fallback_title(text);
        };

        match generate_title(backend, text).await {
            Ok(title) if !title.is_empty() => title,
            Ok(_) => {
                warn!("LLM returned an empty title, using default");
                UNTITLED_NOTE.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Title generation failed, using default");
                UNTITLED_NOTE.to_string()
            }
        }
    }

    fn note_path(&self, title: &str) -> String {
        format!(
            "{}/{}.{}",
            self.config.output_folder.trim_end_matches('/'),
            sanitize_title(title),
            NOTE_EXTENSION
        )
    }

    /// Store path for the source image: its sanitized file name, or a
    /// timestamped name when none is known.
    fn image_path(&self, input: &SynthesisInput, payload: &ImagePayload) -> String {
        let file_name = input
            .file_name
            .as_deref()
            .map(sanitize_file_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "handwriting-{}.{}",
                    Utc::now().format("%Y%m%d-%H%M%S"),
                    payload.extension()
                )
            });
        format!("{}/{}", self.image_folder(), file_name)
    }

    fn image_folder(&self) -> &str {
        self.config.image_folder.trim_end_matches('/')
    }

    /// Put the source image at `path`, replacing any file there.
    async fn store_image(&self, input: &SynthesisInput, path: &str) -> Result<()> {
        self.store.create_folder_if_missing(self.image_folder()).await?;

        match input.source_id.as_deref() {
            Some(source) if source == path => {}
            Some(source) => {
                self.store.delete_if_exists(path).await?;
                self.store.rename_or_move(source, path).await?;
            }
            None => {
                self.store.delete_if_exists(path).await?;
                self.store.create_binary(path, &input.image).await?;
            }
        }

        debug!(image = %path, "Stored source image");
        Ok(())
    }

    /// Write the note at `path`. A note already there is set aside until the
    /// run commits or rolls back.
    async fn write_note(&self, path: &str, content: &str) -> Result<PendingNote> {
        let folder = self.config.output_folder.trim_end_matches('/');
        self.store.create_folder_if_missing(folder).await?;

        let replaces_existing = self
            .store
            .list_documents()
            .await?
            .iter()
            .any(|doc| doc.id == path);

        let backup = if replaces_existing {
            let backup = format!("{}.{}", path, REPLACED_NOTE_SUFFIX);
            self.store.delete_if_exists(&backup).await?;
            self.store.rename_or_move(path, &backup).await?;
            Some(backup)
        } else {
            None
        };

        match self.store.create_document(path, content).await {
            Ok(note) => Ok(PendingNote { note, backup }),
            Err(e) => {
                if let Some(ref backup) = backup {
                    self.restore(backup, path).await;
                }
                Err(e)
            }
        }
    }

    /// Drop the replaced note, if any.
    async fn commit(&self, pending: PendingNote) -> DocumentRef {
        if let Some(backup) = pending.backup {
            if let Err(e) = self.store.delete_if_exists(&backup).await {
                warn!(backup = %backup, error = %e, "Failed to remove replaced note");
            }
        }
        pending.note
    }

    /// Remove the new note and put back the one it replaced.
    async fn rollback(&self, pending: PendingNote) {
        if let Err(e) = self.store.delete_if_exists(&pending.note.id).await {
            warn!(note = %pending.note.id, error = %e, "Failed to remove note after failure");
            return;
        }
        if let Some(backup) = pending.backup {
            self.restore(&backup, &pending.note.id).await;
        }
    }

    async fn restore(&self, backup: &str, path: &str) {
        if let Err(e) = self.store.rename_or_move(backup, path).await {
            warn!(backup = %backup, note = %path, error = %e, "Failed to restore replaced note");
        }
    }
}

/// A written note whose run has not finished yet.
struct PendingNote {
    note: DocumentRef,
    /// Where the note previously at the same path was set aside.
    backup: Option<String>,
}

/// First words of the text, capped in length, or the untitled default.
pub fn fallback_title(text: &str) -> String {
    let title: String = text
        .split_whitespace()
        .take(TITLE_FALLBACK_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect();

    let title = title.trim();
    if title.is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        title.to_string()
    }
}

/// Strip characters that are invalid in file names.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !FORBIDDEN_TITLE_CHARS.contains(c) && !c.is_control())
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').trim();

    if cleaned.is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        cleaned.to_string()
    }
}

fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name);
    base.chars()
        .filter(|c| !FORBIDDEN_TITLE_CHARS.contains(c) && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
