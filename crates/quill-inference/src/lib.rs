//! # quill-inference
//!
//! Vision LLM access for quill.
//!
//! This crate provides:
//! - The [`VisionBackend`] trait
//! - OpenAI chat completions and Anthropic messages backends
//! - Recognition and title prompts
//! - Parsing of `TEXT:` / `TAGS:` / `SUMMARY:` structured responses
//! - Backend selection from [`quill_core::QuillConfig`]
//!
//! # Feature Flags
//!
//! - `mock`: Expose [`mock::MockVisionBackend`] for downstream tests
//!
//! # Example
//!
//! ```rust,no_run
//! use quill_core::{ImagePayload, QuillConfig};
//! use quill_inference::{build_backend, recognize_vision, VisionOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = QuillConfig::load().unwrap();
//!     let backend = build_backend(&config).unwrap().expect("no provider configured");
//!     let image = ImagePayload::from_bytes(&std::fs::read("page.jpg").unwrap()).unwrap();
//!     let result = recognize_vision(backend.as_ref(), &image, &VisionOptions::from(&config))
//!         .await
//!         .unwrap();
//!     println!("{}", result.text);
//! }
//! ```

pub mod anthropic;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod recognition;
pub mod response;
pub mod vision;

// Mock vision backend for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use anthropic::AnthropicVisionBackend;
pub use openai::OpenAIVisionBackend;
pub use provider::build_backend;
pub use recognition::{generate_title, recognize_vision, VisionOptions};
pub use response::{parse_structured_response, StructuredResponse};
pub use vision::VisionBackend;
