//! Anthropic vision backend.
//!
//! Sends the prompt and a base64 image block to `POST {base_url}/v1/messages`
//! with the `x-api-key` and `anthropic-version` headers, and returns the
//! first text block of the response.

mod backend;
mod types;

pub use backend::AnthropicVisionBackend;
pub use types::*;
