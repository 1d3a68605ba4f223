//! Mock vision backend for deterministic testing.
//!
//! Responses are served from a queue first, then from a fixed default. Every
//! call is logged so tests can assert on prompts and image traffic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_inference::mock::MockVisionBackend;
//!
//! let backend = MockVisionBackend::new()
//!     .with_response("TEXT:\nHello world")
//!     .with_response("Greeting Note");
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quill_core::{Error, ImagePayload, LlmProvider, Result};

use crate::vision::VisionBackend;

/// A logged backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub prompt: String,
    pub max_tokens: u32,
    /// MIME type of the attached image, for image requests.
    pub image_mime: Option<String>,
}

/// Mock vision backend for testing.
#[derive(Clone)]
pub struct MockVisionBackend {
    provider: LlmProvider,
    model: String,
    default_response: String,
    queued: Arc<Mutex<VecDeque<Result<String>>>>,
    fail_all: bool,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockVisionBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVisionBackend {
    /// Create a new mock backend answering with `"Mock response"`.
    pub fn new() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            model: "mock-vision".to_string(),
            default_response: "Mock response".to_string(),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            fail_all: false,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Report a different provider.
    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Set the response used once the queue is empty.
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Queue a response for the next unanswered call.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.queued.lock().unwrap().push_back(Ok(response.into()));
        self
    }

    /// Queue a provider failure with the given status.
    pub fn with_error(self, status: u16, message: impl Into<String>) -> Self {
        self.queued
            .lock()
            .unwrap()
            .push_back(Err(Error::provider(status, message)));
        self
    }

    /// Fail every call once the queue is empty.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of calls that carried an image.
    pub fn image_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.image_mime.is_some())
            .count()
    }

    fn respond(&self, call: MockCall) -> Result<String> {
        self.call_log.lock().unwrap().push(call);

        if let Some(next) = self.queued.lock().unwrap().pop_front() {
            return next;
        }
        if self.fail_all {
            return Err(Error::provider(500, "mock failure"));
        }
        Ok(self.default_response.clone())
    }
}

#[async_trait]
impl VisionBackend for MockVisionBackend {
    async fn complete_with_image(
        &self,
        image: &ImagePayload,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        self.respond(MockCall {
            prompt: prompt.to_string(),
            max_tokens,
            image_mime: Some(image.mime_type.clone()),
        })
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        self.respond(MockCall {
            prompt: prompt.to_string(),
            max_tokens,
            image_mime: None,
        })
    }

    fn provider(&self) -> LlmProvider {
        self.provider
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_default() {
        let backend = MockVisionBackend::new()
            .with_default_response("fallback")
            .with_response("first");

        assert_eq!(backend.complete("a", 10).await.unwrap(), "first");
        assert_eq!(backend.complete("b", 10).await.unwrap(), "fallback");
        assert_eq!(backend.get_calls().len(), 2);
        assert_eq!(backend.get_calls()[1].prompt, "b");
    }

    #[tokio::test]
    async fn test_queued_error() {
        let backend = MockVisionBackend::new().with_error(429, "slow down");
        let err = backend.complete("a", 10).await.unwrap_err();
        assert!(matches!(err, Error::Provider { status: Some(429), .. }));
        assert!(backend.complete("a", 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_backend() {
        let backend = MockVisionBackend::new().failing();
        assert!(backend.complete("a", 10).await.is_err());
    }
}
