//! Recognition strategy selection.

use std::sync::Arc;

use tracing::debug;

use quill_core::{defaults, Error, ImagePayload, QuillConfig, RecognitionResult, Result};
use quill_inference::{recognize_vision, VisionBackend, VisionOptions};

use crate::ocr::{recognize_local, OcrWorker};

/// How an image is turned into text.
#[derive(Clone)]
pub enum RecognitionStrategy {
    /// Multi-pass local OCR, optionally followed by the LLM enhancement pass.
    Local {
        worker: Arc<OcrWorker>,
        enhancer: Option<Arc<dyn VisionBackend>>,
    },
    /// One structured request to a vision LLM.
    Vision {
        backend: Arc<dyn VisionBackend>,
        options: VisionOptions,
    },
}

impl RecognitionStrategy {
    /// Pick the strategy the configuration asks for.
    ///
    /// `backend` is the configured provider, if any. Vision mode without one
    /// is a [`Error::ProviderConfig`] error.
    pub fn select(
        config: &QuillConfig,
        worker: Arc<OcrWorker>,
        backend: Option<Arc<dyn VisionBackend>>,
    ) -> Result<Self> {
        if config.use_vision_for_ocr {
            let backend = backend.ok_or_else(|| {
                Error::ProviderConfig(format!(
                    "vision recognition needs an API key for provider '{}'",
                    config.llm_provider
                ))
            })?;
            return Ok(Self::Vision {
                backend,
                options: VisionOptions::from(config),
            });
        }

        let enhancer = if config.enhance_with_llm { backend } else { None };
        Ok(Self::Local { worker, enhancer })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::Vision { .. } => "vision",
        }
    }

    /// Recognize one image. `image` is the raw encoded bytes and `payload`
    /// its transport encoding.
    pub async fn recognize(
        &self,
        image: &[u8],
        payload: &ImagePayload,
    ) -> Result<RecognitionResult> {
        match self {
            Self::Local { worker, enhancer } => {
                let text = recognize_local(worker, image).await?;
                match enhancer {
                    Some(backend) => Ok(enhance(backend.as_ref(), text)),
                    None => Ok(RecognitionResult::text_only(
                        text,
                        defaults::LOCAL_OCR_CONFIDENCE,
                    )),
                }
            }
            Self::Vision { backend, options } => {
                recognize_vision(backend.as_ref(), payload, options).await
            }
        }
    }
}

/// LLM enhancement of local OCR output.
///
/// Currently a pass-through: the text is returned unchanged with no tags or
/// summary, so tag extraction still runs downstream.
fn enhance(backend: &dyn VisionBackend, text: String) -> RecognitionResult {
    debug!(
        provider = %backend.provider(),
        model = backend.model_name(),
        "Enhancement pass leaves OCR text unchanged"
    );
    RecognitionResult::text_only(text, defaults::LOCAL_OCR_CONFIDENCE)
}
