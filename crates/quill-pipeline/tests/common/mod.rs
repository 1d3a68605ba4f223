//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quill_core::{
    DocumentRef, DocumentStore, Error, OcrEngine, OcrParameters, PageSegmentation, QuillConfig,
    Result,
};
use quill_pipeline::{MemoryStore, OcrWorker};

/// Smallest byte string `infer` recognizes as a PNG.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

// =============================================================================
// MOCK OCR ENGINE
// =============================================================================

/// OCR engine answering per page-segmentation mode.
///
/// Modes without a configured output return an empty string.
#[derive(Default)]
pub struct MockOcrEngine {
    outputs: HashMap<u8, Option<String>>,
    current: Mutex<Option<OcrParameters>>,
    calls: Mutex<Vec<OcrParameters>>,
    fail_initialize: bool,
    initialized: AtomicBool,
    terminated: AtomicBool,
}

impl MockOcrEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same text for every mode.
    pub fn uniform(text: &str) -> Self {
        PageSegmentation::PASSES
            .iter()
            .fold(Self::new(), |engine, mode| engine.with_output(*mode, text))
    }

    pub fn with_output(mut self, mode: PageSegmentation, text: &str) -> Self {
        self.outputs.insert(mode.psm(), Some(text.to_string()));
        self
    }

    pub fn with_failure(mut self, mode: PageSegmentation) -> Self {
        self.outputs.insert(mode.psm(), None);
        self
    }

    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    /// Parameters of every recognition call, in order.
    pub fn calls(&self) -> Vec<OcrParameters> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_psms(&self) -> Vec<u8> {
        self.calls()
            .iter()
            .map(|p| p.page_segmentation.psm())
            .collect()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for MockOcrEngine {
    async fn initialize(&self, _language: &str) -> Result<()> {
        if self.fail_initialize {
            return Err(Error::Ocr("mock engine failed to load".to_string()));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn set_parameters(&self, params: &OcrParameters) -> Result<()> {
        *self.current.lock().unwrap() = Some(params.clone());
        Ok(())
    }

    async fn recognize(&self, _image: &[u8]) -> Result<String> {
        let params = self
            .current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Ocr("parameters not set".to_string()))?;
        self.calls.lock().unwrap().push(params.clone());

        match self.outputs.get(&params.page_segmentation.psm()) {
            Some(Some(text)) => Ok(text.clone()),
            Some(None) => Err(Error::Ocr(format!(
                "mock failure for psm {}",
                params.page_segmentation.psm()
            ))),
            None => Ok(String::new()),
        }
    }

    async fn terminate(&self) -> Result<()> {
        self.terminated.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Worker around `engine`, already initialized.
pub async fn ready_worker(engine: Arc<MockOcrEngine>) -> Arc<OcrWorker> {
    let worker = Arc::new(OcrWorker::new(engine));
    worker.initialize("eng").await.unwrap();
    worker
}

// =============================================================================
// STORES
// =============================================================================

/// Memory store with switchable failures.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    /// `read_text` fails for every document.
    pub fail_reads: bool,
    /// `create_document` fails for every path.
    pub fail_creates: bool,
    /// `rename_or_move` fails for sources under this prefix.
    pub fail_moves_from: Option<&'static str>,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        self.inner.list_documents().await
    }

    async fn read_text(&self, id: &str) -> Result<String> {
        if self.fail_reads {
            return Err(Error::Store(format!("cannot read {}", id)));
        }
        self.inner.read_text(id).await
    }

    async fn create_document(&self, path: &str, content: &str) -> Result<DocumentRef> {
        if self.fail_creates {
            return Err(Error::Store("disk full".to_string()));
        }
        self.inner.create_document(path, content).await
    }

    async fn delete_if_exists(&self, path: &str) -> Result<()> {
        self.inner.delete_if_exists(path).await
    }

    async fn create_folder_if_missing(&self, path: &str) -> Result<()> {
        self.inner.create_folder_if_missing(path).await
    }

    async fn create_binary(&self, path: &str, data: &[u8]) -> Result<DocumentRef> {
        self.inner.create_binary(path, data).await
    }

    async fn rename_or_move(&self, id: &str, new_path: &str) -> Result<DocumentRef> {
        if self.fail_moves_from.is_some_and(|prefix| id.starts_with(prefix)) {
            return Err(Error::Store(format!("cannot move {}", id)));
        }
        self.inner.rename_or_move(id, new_path).await
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Defaults: local OCR, no provider, backlinks on.
pub fn local_config() -> QuillConfig {
    QuillConfig::default()
}

/// Vision recognition with tags and summary requested.
pub fn vision_config() -> QuillConfig {
    QuillConfig {
        use_vision_for_ocr: true,
        suggest_tags: true,
        summarize: true,
        ..Default::default()
    }
}
