//! AgentLoop - conversation state machine over a chat transport and a tool registry

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::LoopConfig;
use crate::llm::{
    CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, TokenUsage, ToolCall, ToolDefinition,
};
use crate::tools::ToolRegistry;

/// Errors that end an agent loop run
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("chat error: {0}")]
    Transport(#[from] LlmError),

    #[error("max iterations ({max_iterations}) reached without final answer")]
    IterationBudgetExceeded { max_iterations: u32 },
}

/// Result of a run that ended with a final answer
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Content of the final assistant message
    pub answer: String,

    /// Iterations that ended in tool calls
    pub iterations: u32,

    /// Full conversation, ending with the final assistant message
    pub messages: Vec<Message>,

    /// Token usage summed over every transport call
    pub usage: TokenUsage,
}

/// Drives a conversation until the model answers without calling tools
///
/// Each iteration is one transport call. Tool calls within an iteration run
/// sequentially, in the order the model listed them, and each produces exactly
/// one tool message. Tool failures are fed back to the model; transport
/// failures end the run.
pub struct AgentLoop {
    client: Arc<dyn LlmClient>,
    registry: Arc<ToolRegistry>,
    config: LoopConfig,
}

impl AgentLoop {
    pub fn new(client: Arc<dyn LlmClient>, registry: Arc<ToolRegistry>, config: LoopConfig) -> Self {
        debug!(model = %config.model, max_iterations = %config.max_iterations, tool_count = %registry.len(), "AgentLoop::new: called");
        Self {
            client,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Run one conversation seeded with the system prompt and `user_message`
    pub async fn run(&self, user_message: &str) -> Result<AgentOutcome, AgentError> {
        debug!(message_len = %user_message.len(), "AgentLoop::run: called");
        let tools = self.registry.schemas();
        let mut messages = vec![Message::system(&self.config.system_prompt), Message::user(user_message)];
        let mut usage = TokenUsage::default();

        for iteration in 0..self.config.max_iterations {
            debug!(iteration, "AgentLoop::run: calling model");
            let response = self.complete(&messages, &tools).await?;
            usage.add(response.usage);

            let message = response.message;
            if !message.has_tool_calls() {
                info!(iterations = %iteration, total_tokens = %usage.total(), "final answer received");
                let answer = message.content.clone();
                messages.push(message);
                return Ok(AgentOutcome {
                    answer,
                    iterations: iteration,
                    messages,
                    usage,
                });
            }

            info!(count = %message.tool_calls.len(), "assistant wants to call tool(s)");
            let calls = message.tool_calls.clone();
            messages.push(message);
            for call in &calls {
                let content = self.dispatch(call).await;
                messages.push(Message::tool(content));
            }
        }

        warn!(max_iterations = %self.config.max_iterations, "iteration budget exhausted");
        Err(AgentError::IterationBudgetExceeded {
            max_iterations: self.config.max_iterations,
        })
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<CompletionResponse, AgentError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            tools: tools.to_vec(),
        };
        match self.client.complete(request).await {
            Ok(response) => {
                debug!(tool_calls = %response.message.tool_calls.len(), "AgentLoop::complete: response received");
                Ok(response)
            }
            Err(e) => {
                debug!(error = %e, "AgentLoop::complete: transport error");
                Err(e.into())
            }
        }
    }

    /// Execute one tool call, turning any failure into an error payload
    async fn dispatch(&self, call: &ToolCall) -> String {
        info!(tool = %call.name(), "calling tool");
        debug!(args = ?call.arguments(), "AgentLoop::dispatch: arguments");
        match self.registry.execute(call.name(), call.arguments()).await {
            Ok(result) => {
                debug!(tool = %call.name(), %result, "AgentLoop::dispatch: tool succeeded");
                result
            }
            Err(e) => {
                warn!(tool = %call.name(), error = %e, "tool call failed");
                e.to_payload()
            }
        }
    }
}
