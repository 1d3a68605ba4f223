//! # quill-pipeline
//!
//! Turns photographed handwriting into markdown notes.
//!
//! This crate provides:
//! - [`OcrWorker`]: lifecycle and exclusive access for a stateful OCR engine
//! - [`TesseractEngine`]: OCR through the `tesseract` binary
//! - [`recognize_local`]: best-of-three page segmentation OCR
//! - [`RecognitionStrategy`]: local OCR or vision LLM
//! - [`NoteSynthesizer`]: the end-to-end pipeline
//! - [`VaultStore`] and [`MemoryStore`] document stores
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use quill_core::QuillConfig;
//! use quill_pipeline::{NoteSynthesizer, VaultStore};
//!
//! #[tokio::main]
//! async fn main() -> quill_core::Result<()> {
//!     let config = QuillConfig::load()?;
//!     let store = Arc::new(VaultStore::new("/home/me/vault"));
//!     let synthesizer = NoteSynthesizer::from_config(config, store).await?;
//!
//!     let note = synthesizer.process_file(Path::new("page.jpg")).await?;
//!     println!("created {}", note.id);
//!
//!     synthesizer.shutdown().await
//! }
//! ```

pub mod ocr;
pub mod recognition;
pub mod store;
pub mod synthesizer;

pub use ocr::{recognize_local, EngineState, OcrSession, OcrWorker, TesseractEngine};
pub use recognition::RecognitionStrategy;
pub use store::{MemoryStore, VaultStore};
pub use synthesizer::{fallback_title, sanitize_title, NoteSynthesizer, SynthesisInput};
