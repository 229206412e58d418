//! Tool error types

use thiserror::Error;

/// Errors that can occur during tool registration or execution
///
/// Execution errors are recoverable: the agent loop reports them back to
/// the model as an error-shaped tool result and keeps going.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("tool already registered: {name}")]
    DuplicateTool { name: String },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("command execution denied by user")]
    PermissionDenied { command: String },

    #[error("failed to execute command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Failed(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Build an I/O error with a short description of what was attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build an invalid-argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// JSON payload fed back to the model in place of a tool result
    pub fn to_payload(&self) -> String {
        serde_json::json!({ "error": self.to_string() }).to_string()
    }
}
