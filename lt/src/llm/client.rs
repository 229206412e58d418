//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Chat transport - each call carries the full conversation
///
/// The agent loop owns all conversation state and resends it on every call.
/// Implementations must not retry: any error they return aborts the loop.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single non-streaming completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
