//! Anthropic messages API vision backend.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use quill_core::{defaults, Error, ImagePayload, LlmProvider, ProviderSettings, Result};

use super::types::*;
use crate::vision::{error_from_response, http_client, VisionBackend};

/// Vision backend for the Anthropic messages API.
pub struct AnthropicVisionBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl AnthropicVisionBackend {
    /// Create a backend from provider settings.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let client = http_client()?;

        info!(
            "Initializing Anthropic vision backend: url={}, model={}",
            settings.base_url, settings.model
        );

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.api_key {
            req = req.header("x-api-key", api_key);
        }

        req.header("anthropic-version", defaults::ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
    }

    async fn send(&self, content: Vec<ContentBlock>, max_tokens: u32) -> Result<String> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            messages: vec![Message::user(content)],
        };

        let response = self
            .build_request("/v1/messages")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("Anthropic request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(LlmProvider::Anthropic, response).await);
        }

        let result: MessagesResponse = response.json().await.map_err(|e| {
            Error::malformed_response(format!("Failed to parse Anthropic response: {}", e))
        })?;

        let text = result
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| Error::malformed_response("Anthropic response has no text block"))?;

        debug!(
            stop_reason = ?result.stop_reason,
            "Generation complete, response length: {}",
            text.len()
        );
        Ok(text)
    }
}

#[async_trait]
impl VisionBackend for AnthropicVisionBackend {
    #[instrument(skip(self, image, prompt), fields(model = %self.model, mime = %image.mime_type))]
    async fn complete_with_image(
        &self,
        image: &ImagePayload,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let content = vec![
            ContentBlock::Text {
                text: prompt.to_string(),
            },
            ContentBlock::Image {
                source: ImageSource::base64(&image.mime_type, &image.base64),
            },
        ];
        self.send(content, max_tokens).await
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let content = vec![ContentBlock::Text {
            text: prompt.to_string(),
        }];
        self.send(content, max_tokens).await
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Anthropic
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_default_settings() {
        let backend = AnthropicVisionBackend::new(&ProviderSettings::anthropic_default()).unwrap();
        assert_eq!(backend.base_url, defaults::ANTHROPIC_URL);
        assert_eq!(backend.model_name(), defaults::ANTHROPIC_MODEL);
        assert_eq!(backend.provider(), LlmProvider::Anthropic);
    }
}
