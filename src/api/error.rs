//! API Errors
//!
//! Error type shared by every resource client call.

use serde::Deserialize;
use thiserror::Error;

/// Failure of a single API operation
#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected client-side before any request was sent
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Backend {
        status: u16,
        kind: Option<String>,
        message: String,
    },

    /// Backend answered 401; the session has been torn down
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Backend { status: 404, .. })
    }
}

/// Error body returned by the backend: `{"error": {"type": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Format an API error for the status line and toasts.
/// Backend messages are shown verbatim; transport failures get friendly text.
pub fn format_api_error(error: &ApiError) -> String {
    match error {
        ApiError::Validation { message, .. } => message.clone(),
        ApiError::Backend { message, .. } => message.clone(),
        ApiError::Unauthorized => "Authentication failed. Enter a valid API key.".to_string(),
        ApiError::Transport(e) if e.is_timeout() => {
            "Request timed out. Check your network connection and try again.".to_string()
        }
        ApiError::Transport(e) if e.is_connect() => {
            "Could not reach the API endpoint. Check the configured URL.".to_string()
        }
        ApiError::Transport(_) => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        ApiError::Decode(_) => "Unexpected response from the server.".to_string(),
        ApiError::Endpoint(e) => format!("Invalid endpoint: {}", e),
        ApiError::Io(e) => format!("Could not read file: {}", e),
    }
}
