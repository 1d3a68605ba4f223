//! Error types for quill.

use thiserror::Error;

/// Result type alias using quill's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for quill operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or unusable input (image bytes, recognized text)
    #[error("Validation error: {0}")]
    Validation(String),

    /// OCR engine used before initialization or after teardown
    #[error("OCR engine not ready: {0}")]
    EngineNotReady(String),

    /// Vision mode selected without a usable provider
    #[error("Provider configuration error: {0}")]
    ProviderConfig(String),

    /// Vision/LLM provider returned a non-success status or a malformed body
    #[error("Provider error{}: {message}", status_suffix(.status))]
    Provider {
        status: Option<u16>,
        message: String,
    },

    /// Document store operation failed
    #[error("Store error: {0}")]
    Store(String),

    /// Every OCR attempt failed, or the engine itself errored
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Top-level synthesis failure wrapping the step that failed
    #[error("Processing failed: {message}")]
    Processing {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl Error {
    /// Build a provider error from an HTTP status and body text.
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Error::Provider {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build a provider error for a response that could not be interpreted.
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Error::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// Wrap an error for top-level reporting. Already-wrapped errors are
    /// returned unchanged.
    pub fn processing(self) -> Self {
        match self {
            Error::Processing { .. } => self,
            other => Error::Processing {
                message: other.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through `Processing` wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Processing { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(e: crate::config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
