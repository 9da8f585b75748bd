//! Provider error types.

use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur during provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The response stream could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing API key.
    #[error("Missing API key for provider: {0}")]
    MissingApiKey(String),

    /// Operation cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// API error with status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Internal provider error.
    #[error("Provider error: {message}")]
    Internal { message: String },
}

impl ProviderError {
    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create an API error.
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
