//! Backend selection from configuration.

use std::sync::Arc;

use tracing::debug;

use quill_core::{LlmProvider, QuillConfig, Result};

use crate::anthropic::AnthropicVisionBackend;
use crate::openai::OpenAIVisionBackend;
use crate::vision::VisionBackend;

/// Build the configured vision backend.
///
/// Returns `None` when no provider is selected or the selected provider has
/// no API key.
pub fn build_backend(config: &QuillConfig) -> Result<Option<Arc<dyn VisionBackend>>> {
    if !config.provider_configured() {
        debug!(provider = %config.llm_provider, "No vision provider configured");
        return Ok(None);
    }

    let backend: Arc<dyn VisionBackend> = match config.llm_provider {
        LlmProvider::None => return Ok(None),
        LlmProvider::OpenAI => Arc::new(OpenAIVisionBackend::new(&config.openai)?),
        LlmProvider::Anthropic => Arc::new(AnthropicVisionBackend::new(&config.anthropic)?),
    };

    Ok(Some(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ProviderSettings;

    #[test]
    fn test_no_provider_selected() {
        let config = QuillConfig::default();
        assert!(build_backend(&config).unwrap().is_none());
    }

    #[test]
    fn test_selected_provider_without_key() {
        let config = QuillConfig {
            llm_provider: LlmProvider::Anthropic,
            ..Default::default()
        };
        assert!(build_backend(&config).unwrap().is_none());
    }

    #[test]
    fn test_builds_selected_provider() {
        let config = QuillConfig {
            llm_provider: LlmProvider::Anthropic,
            anthropic: ProviderSettings {
                api_key: Some("sk-ant".to_string()),
                ..ProviderSettings::anthropic_default()
            },
            ..Default::default()
        };
        let backend = build_backend(&config).unwrap().unwrap();
        assert_eq!(backend.provider(), LlmProvider::Anthropic);

        let config = QuillConfig {
            llm_provider: LlmProvider::OpenAI,
            openai: ProviderSettings {
                api_key: Some("sk-openai".to_string()),
                ..ProviderSettings::openai_default()
            },
            ..Default::default()
        };
        let backend = build_backend(&config).unwrap().unwrap();
        assert_eq!(backend.provider(), LlmProvider::OpenAI);
        assert_eq!(backend.model_name(), "gpt-4o");
    }
}
