//! OCR engine backed by the `tesseract` command-line binary.
//!
//! Each recognition writes the image to a temp file and runs
//! `tesseract <image> stdout -l <lang> --psm <n> -c ...`, reading the text
//! from stdout.

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

use quill_core::defaults::{OCR_TIMEOUT_SECS, TESSERACT_BINARY};
use quill_core::{Error, OcrEngine, OcrParameters, Result};

/// Run a command with a timeout, returning stdout as a string.
async fn run_cmd_with_timeout(cmd: &mut Command, timeout_secs: u64) -> Result<String> {
    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| Error::Ocr(format!("tesseract timed out after {}s", timeout_secs)))?
        .map_err(|e| Error::Ocr(format!("Failed to execute tesseract: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Ocr(format!(
            "tesseract failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Tesseract CLI engine.
pub struct TesseractEngine {
    binary: String,
    timeout_secs: u64,
    language: Mutex<Option<String>>,
    params: Mutex<Option<OcrParameters>>,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(TESSERACT_BINARY)
    }
}

impl TesseractEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout_secs: OCR_TIMEOUT_SECS,
            language: Mutex::new(None),
            params: Mutex::new(None),
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn language(&self) -> Result<String> {
        self.language
            .lock()
            .map_err(|_| Error::Ocr("engine state poisoned".to_string()))?
            .clone()
            .ok_or_else(|| Error::EngineNotReady("tesseract has no language loaded".to_string()))
    }

    fn params(&self) -> Result<OcrParameters> {
        self.params
            .lock()
            .map_err(|_| Error::Ocr("engine state poisoned".to_string()))?
            .clone()
            .ok_or_else(|| Error::Ocr("recognition parameters not set".to_string()))
    }

    /// Arguments following the input path.
    fn build_args(language: &str, params: &OcrParameters) -> Vec<String> {
        vec![
            "stdout".to_string(),
            "-l".to_string(),
            language.to_string(),
            "--psm".to_string(),
            params.page_segmentation.psm().to_string(),
            "-c".to_string(),
            format!("tessedit_char_whitelist={}", params.char_whitelist),
            "-c".to_string(),
            format!(
                "preserve_interword_spaces={}",
                u8::from(params.preserve_interword_spaces)
            ),
        ]
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn initialize(&self, language: &str) -> Result<()> {
        let version = run_cmd_with_timeout(
            Command::new(&self.binary).arg("--version"),
            self.timeout_secs,
        )
        .await?;
        info!(
            binary = %self.binary,
            version = version.lines().next().unwrap_or("unknown"),
            language,
            "tesseract available"
        );

        *self
            .language
            .lock()
            .map_err(|_| Error::Ocr("engine state poisoned".to_string()))? =
            Some(language.to_string());
        Ok(())
    }

    async fn set_parameters(&self, params: &OcrParameters) -> Result<()> {
        *self
            .params
            .lock()
            .map_err(|_| Error::Ocr("engine state poisoned".to_string()))? = Some(params.clone());
        Ok(())
    }

    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let language = self.language()?;
        let params = self.params()?;

        let mut tmpfile = NamedTempFile::new()?;
        tmpfile.write_all(image)?;
        tmpfile.flush()?;

        debug!(psm = params.page_segmentation.psm(), bytes = image.len(), "Running tesseract");

        run_cmd_with_timeout(
            Command::new(&self.binary)
                .arg(tmpfile.path())
                .args(Self::build_args(&language, &params)),
            self.timeout_secs,
        )
        .await
    }

    async fn terminate(&self) -> Result<()> {
        if let Ok(mut language) = self.language.lock() {
            *language = None;
        }
        if let Ok(mut params) = self.params.lock() {
            *params = None;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::PageSegmentation;

    #[test]
    fn test_build_args() {
        let params = OcrParameters::for_mode(PageSegmentation::SparseText);
        let args = TesseractEngine::build_args("eng", &params);

        assert_eq!(&args[..5], &["stdout", "-l", "eng", "--psm", "11"]);
        assert!(args.contains(&"preserve_interword_spaces=1".to_string()));
        let whitelist = args
            .iter()
            .find(|a| a.starts_with("tessedit_char_whitelist="))
            .unwrap();
        assert!(whitelist.contains("xyz0123"));
        assert!(whitelist.ends_with("!? "));
    }

    #[tokio::test]
    async fn test_recognize_before_initialize_is_not_ready() {
        let engine = TesseractEngine::default();
        let err = engine.recognize(b"image").await.unwrap_err();
        assert!(matches!(err, Error::EngineNotReady(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_fails_initialize() {
        let engine = TesseractEngine::new("/nonexistent/quill-tesseract-binary");
        let err = engine.initialize("eng").await.unwrap_err();
        assert!(matches!(err, Error::Ocr(_)));
    }

    #[tokio::test]
    async fn test_terminate_clears_state() {
        let engine = TesseractEngine::default();
        engine
            .set_parameters(&OcrParameters::for_mode(PageSegmentation::SingleBlock))
            .await
            .unwrap();
        engine.terminate().await.unwrap();
        assert!(engine.params().is_err());
    }
}
