//! Chat transport for looptool
//!
//! The agent loop talks to the model only through the [`LlmClient`] trait.
//! [`OllamaClient`] is the concrete transport used by the `lt` binary.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod ollama;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use ollama::OllamaClient;
pub use types::{
    Arguments, CompletionRequest, CompletionResponse, FunctionCall, Message, Role, TokenUsage, ToolCall,
    ToolDefinition,
};

use crate::config::LlmConfig;

/// Create the chat transport described by `config`
pub fn create_client(config: &LlmConfig, debug_render_only: bool) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(host = %config.host, model = %config.model, %debug_render_only, "create_client: called");
    let client = OllamaClient::from_config(config)?.with_debug_render_only(debug_render_only);
    Ok(Arc::new(client))
}
