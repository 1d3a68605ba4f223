//! OpenAI vision backend.
//!
//! Sends the prompt and an inline `data:` URL image as a single user message
//! to `POST {base_url}/chat/completions` and returns
//! `choices[0].message.content`.
//!
//! # Example
//!
//! ```rust,no_run
//! use quill_core::ProviderSettings;
//! use quill_inference::openai::OpenAIVisionBackend;
//! use quill_inference::VisionBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = ProviderSettings {
//!         api_key: Some("sk-...".to_string()),
//!         ..ProviderSettings::openai_default()
//!     };
//!     let backend = OpenAIVisionBackend::new(&settings).unwrap();
//!     let title = backend.complete("Name this note", 20).await.unwrap();
//! }
//! ```

mod backend;
mod types;

pub use backend::OpenAIVisionBackend;
pub use types::*;
