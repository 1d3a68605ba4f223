//! Vision backend trait shared by all LLM providers.

use std::time::Duration;

use async_trait::async_trait;
use quill_core::{defaults, Error, ImagePayload, LlmProvider, Result};
use reqwest::Client;
use tracing::warn;

/// Backend for vision-capable LLMs.
///
/// Implementations send one request per call and return the generated text
/// verbatim; interpreting that text is left to the caller.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Send a prompt together with an inline image.
    async fn complete_with_image(
        &self,
        image: &ImagePayload,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String>;

    /// Send a text-only prompt.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Which provider this backend talks to.
    fn provider(&self) -> LlmProvider;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// HTTP client with the provider request timeout applied.
pub(crate) fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(defaults::LLM_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::Request(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-2xx response into a provider error carrying the status.
///
/// Both providers wrap failures as `{"error": {"message": ...}}`; any other
/// body is passed through as text.
pub(crate) async fn error_from_response(
    provider: LlmProvider,
    response: reqwest::Response,
) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);

    warn!(%provider, status = status.as_u16(), "Provider request failed: {}", message);
    Error::provider(
        status.as_u16(),
        format!("{} returned {}: {}", provider, status, message),
    )
}
