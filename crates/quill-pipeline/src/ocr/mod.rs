//! Local OCR: engine lifecycle, the tesseract engine, and multi-pass
//! recognition.

mod multipass;
mod tesseract;
mod worker;

pub use multipass::recognize_local;
pub use tesseract::TesseractEngine;
pub use worker::{EngineState, OcrSession, OcrWorker};
