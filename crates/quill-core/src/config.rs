//! Configuration for the synthesis pipeline.
//!
//! Configuration can be loaded from:
//! - a TOML file (default: `~/.config/quill/config.toml`)
//! - environment variables (`QUILL_*` prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use quill_core::config::QuillConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = QuillConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = QuillConfig::from_file(std::path::Path::new("quill.toml")).expect("Failed to load");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

use crate::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Vision/LLM provider selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    None,
    OpenAI,
    Anthropic,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(ConfigError::InvalidProvider(s.to_string())),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::OpenAI => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Connection settings for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the API.
    pub base_url: String,
    /// Vision-capable model name.
    pub model: String,
}

impl ProviderSettings {
    pub fn openai_default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::OPENAI_URL.to_string(),
            model: defaults::OPENAI_MODEL.to_string(),
        }
    }

    pub fn anthropic_default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::ANTHROPIC_URL.to_string(),
            model: defaults::ANTHROPIC_MODEL.to_string(),
        }
    }

    /// Whether an API key is present.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    fn validate(&self, name: &str) -> ConfigResult<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{} base_url must start with http:// or https://, got: {}",
                name, self.base_url
            )));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} model cannot be empty",
                name
            )));
        }

        Ok(())
    }
}

/// Pipeline configuration, consumed read-only by the synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    /// Minimum tag confidence in [0, 1]. Carried for compatibility; no code
    /// path filters on it.
    pub min_tag_confidence: f32,
    /// Link new notes to similar existing documents.
    pub auto_backlink: bool,
    /// Language code passed to the OCR engine.
    pub ocr_language: String,
    /// Selected vision/LLM provider.
    pub llm_provider: LlmProvider,
    /// Transcribe with the vision provider instead of local OCR.
    pub use_vision_for_ocr: bool,
    /// Run the LLM enhancement pass after local OCR.
    pub enhance_with_llm: bool,
    /// Ask the vision provider for tags.
    pub suggest_tags: bool,
    /// Ask the vision provider for a summary.
    pub summarize: bool,
    /// Output token budget for recognition requests.
    pub max_tokens: u32,
    /// Store folder new notes are written to.
    pub output_folder: String,
    /// Store folder source images are written to.
    pub image_folder: String,
    /// Path or name of the tesseract binary.
    pub tesseract_path: String,
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            min_tag_confidence: defaults::MIN_TAG_CONFIDENCE,
            auto_backlink: true,
            ocr_language: defaults::OCR_LANGUAGE.to_string(),
            llm_provider: LlmProvider::None,
            openai: ProviderSettings::openai_default(),
            anthropic: ProviderSettings::anthropic_default(),
            use_vision_for_ocr: false,
            enhance_with_llm: false,
            suggest_tags: true,
            summarize: false,
            max_tokens: defaults::MAX_TOKENS,
            output_folder: defaults::OUTPUT_FOLDER.to_string(),
            image_folder: defaults::IMAGE_FOLDER.to_string(),
            tesseract_path: defaults::TESSERACT_BINARY.to_string(),
        }
    }
}

impl QuillConfig {
    /// Get the default config file path.
    ///
    /// Returns: ~/.config/quill/config.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("quill");
        path.push("config.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            let config = Self::from_env()?;
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text, substituting `${VAR}` placeholders.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `QUILL_LLM_PROVIDER` | `none` |
    /// | `QUILL_OPENAI_API_KEY` / `_BASE_URL` / `_MODEL` | unset / OpenAI / `gpt-4o` |
    /// | `QUILL_ANTHROPIC_API_KEY` / `_BASE_URL` / `_MODEL` | unset / Anthropic / `claude-3-5-sonnet-latest` |
    /// | `QUILL_USE_VISION` | `false` |
    /// | `QUILL_ENHANCE_WITH_LLM` | `false` |
    /// | `QUILL_SUGGEST_TAGS` | `true` |
    /// | `QUILL_SUMMARIZE` | `false` |
    /// | `QUILL_AUTO_BACKLINK` | `true` |
    /// | `QUILL_MAX_TOKENS` | `1000` |
    /// | `QUILL_MIN_TAG_CONFIDENCE` | `0.5` |
    /// | `QUILL_OCR_LANGUAGE` | `eng` |
    /// | `QUILL_OUTPUT_FOLDER` | `Handwritten Notes` |
    /// | `QUILL_IMAGE_FOLDER` | `Handwritten Notes/images` |
    /// | `QUILL_TESSERACT_PATH` | `tesseract` |
    pub fn from_env() -> ConfigResult<Self> {
        let base = Self::default();

        let llm_provider = match env::var("QUILL_LLM_PROVIDER") {
            Ok(value) => value.parse()?,
            Err(_) => base.llm_provider,
        };

        Ok(Self {
            min_tag_confidence: env_parse("QUILL_MIN_TAG_CONFIDENCE", base.min_tag_confidence),
            auto_backlink: env_flag("QUILL_AUTO_BACKLINK", base.auto_backlink),
            ocr_language: env::var("QUILL_OCR_LANGUAGE").unwrap_or(base.ocr_language),
            llm_provider,
            openai: ProviderSettings {
                api_key: env::var("QUILL_OPENAI_API_KEY").ok(),
                base_url: env::var("QUILL_OPENAI_BASE_URL").unwrap_or(base.openai.base_url),
                model: env::var("QUILL_OPENAI_MODEL").unwrap_or(base.openai.model),
            },
            anthropic: ProviderSettings {
                api_key: env::var("QUILL_ANTHROPIC_API_KEY").ok(),
                base_url: env::var("QUILL_ANTHROPIC_BASE_URL").unwrap_or(base.anthropic.base_url),
                model: env::var("QUILL_ANTHROPIC_MODEL").unwrap_or(base.anthropic.model),
            },
            use_vision_for_ocr: env_flag("QUILL_USE_VISION", base.use_vision_for_ocr),
            enhance_with_llm: env_flag("QUILL_ENHANCE_WITH_LLM", base.enhance_with_llm),
            suggest_tags: env_flag("QUILL_SUGGEST_TAGS", base.suggest_tags),
            summarize: env_flag("QUILL_SUMMARIZE", base.summarize),
            max_tokens: env_parse("QUILL_MAX_TOKENS", base.max_tokens),
            output_folder: env::var("QUILL_OUTPUT_FOLDER").unwrap_or(base.output_folder),
            image_folder: env::var("QUILL_IMAGE_FOLDER").unwrap_or(base.image_folder),
            tesseract_path: env::var("QUILL_TESSERACT_PATH").unwrap_or(base.tesseract_path),
        })
    }

    /// Settings of the selected provider, if one is selected.
    pub fn provider_settings(&self) -> Option<&ProviderSettings> {
        match self.llm_provider {
            LlmProvider::None => None,
            LlmProvider::OpenAI => Some(&self.openai),
            LlmProvider::Anthropic => Some(&self.anthropic),
        }
    }

    /// A provider is selected and has an API key.
    pub fn provider_configured(&self) -> bool {
        self.provider_settings()
            .map(ProviderSettings::has_api_key)
            .unwrap_or(false)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.min_tag_confidence) {
            return Err(ConfigError::Validation(format!(
                "min_tag_confidence must be within [0, 1], got: {}",
                self.min_tag_confidence
            )));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "max_tokens must be greater than zero".to_string(),
            ));
        }

        if self.ocr_language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ocr_language cannot be empty".to_string(),
            ));
        }

        if self.output_folder.trim().is_empty() || self.image_folder.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_folder and image_folder cannot be empty".to_string(),
            ));
        }

        self.openai.validate("OpenAI")?;
        self.anthropic.validate("Anthropic")?;

        Ok(())
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
