//! OpenAI chat completions vision backend.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use quill_core::{Error, ImagePayload, LlmProvider, ProviderSettings, Result};

use super::types::*;
use crate::vision::{error_from_response, http_client, VisionBackend};

/// Vision backend for the OpenAI chat completions API.
pub struct OpenAIVisionBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAIVisionBackend {
    /// Create a backend from provider settings.
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let client = http_client()?;

        info!(
            "Initializing OpenAI vision backend: url={}, model={}",
            settings.base_url, settings.model
        );

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    async fn send(&self, content: Vec<ContentPart>, max_tokens: u32) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(content)],
            max_tokens,
        };

        let response = self
            .build_request("/chat/completions")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Request(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(LlmProvider::OpenAI, response).await);
        }

        let result: ChatCompletionResponse = response.json().await.map_err(|e| {
            Error::malformed_response(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::malformed_response("OpenAI response has no message content"))?;

        debug!("Generation complete, response length: {}", content.len());
        Ok(content)
    }
}

#[async_trait]
impl VisionBackend for OpenAIVisionBackend {
    #[instrument(skip(self, image, prompt), fields(model = %self.model, mime = %image.mime_type))]
    async fn complete_with_image(
        &self,
        image: &ImagePayload,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let content = vec![
            ContentPart::Text {
                text: prompt.to_string(),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_data_url(),
                },
            },
        ];
        self.send(content, max_tokens).await
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let content = vec![ContentPart::Text {
            text: prompt.to_string(),
        }];
        self.send(content, max_tokens).await
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenAI
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
