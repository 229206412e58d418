//! Transport error types

use thiserror::Error;

/// Errors that can occur while talking to the chat endpoint
///
/// Every variant is fatal to the agent loop that hit it; there is no retry.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// HTTP status of the failed call, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::ApiError { status, .. } => Some(*status),
            LlmError::Network(e) => e.status().map(|s| s.as_u16()),
            LlmError::InvalidResponse(_) | LlmError::Json(_) => None,
        }
    }
}
