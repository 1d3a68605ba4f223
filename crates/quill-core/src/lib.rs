//! # quill-core
//!
//! Core types, traits, and text heuristics for quill.
//!
//! This crate provides the data model, configuration, and capability traits
//! that the inference and pipeline crates build on, together with the purely
//! lexical pieces of the pipeline: OCR text cleanup, tag extraction, and
//! word-set similarity for backlinks.

pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod similarity;
pub mod tags;
pub mod text;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{ConfigError, LlmProvider, ProviderSettings, QuillConfig};
pub use error::{Error, Result};
pub use models::*;
pub use similarity::{find_related_notes, similarity};
pub use tags::{extract_tags, format_tags, is_stopword, normalize_tag};
pub use text::{normalize, word_count};
pub use traits::*;
