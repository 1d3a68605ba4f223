//! Best-of-three local OCR.

use tracing::{debug, instrument, warn};

use quill_core::{normalize, word_count, Error, OcrParameters, PageSegmentation, Result};

use super::worker::OcrWorker;

/// Recognize `image` once per page-segmentation mode and keep the output
/// with the most words.
///
/// Modes run strictly in [`PageSegmentation::PASSES`] order. Ties keep the
/// earlier mode. A failing mode is skipped; if every mode fails the last
/// error is reported. The winning text is normalized.
#[instrument(skip(worker, image), fields(bytes = image.len()))]
pub async fn recognize_local(worker: &OcrWorker, image: &[u8]) -> Result<String> {
    let session = worker.session().await?;

    let mut best: Option<(PageSegmentation, String, usize)> = None;
    let mut last_error = None;

    for mode in PageSegmentation::PASSES {
        match session.recognize(&OcrParameters::for_mode(mode), image).await {
            Ok(text) => {
                let words = word_count(text.trim());
                debug!(psm = mode.psm(), words, "OCR pass complete");
                let better = best.as_ref().map_or(true, |(_, _, top)| words > *top);
                if better {
                    best = Some((mode, text, words));
                }
            }
            Err(e) => {
                warn!(
                    psm = mode.psm(),
                    engine = session.engine_name(),
                    error = %e,
                    "OCR pass failed, skipping"
                );
                last_error = Some(e);
            }
        }
    }

    let (mode, text, words) = best.ok_or_else(|| {
        Error::Ocr(format!(
            "all page segmentation modes failed: {}",
            last_error.map(|e| e.to_string()).unwrap_or_default()
        ))
    })?;

    debug!(%mode, psm = mode.psm(), words, "Selected OCR result");
    Ok(normalize(&text))
}
