//! Ollama API client implementation
//!
//! Implements the LlmClient trait for Ollama's native `/api/chat` endpoint.
//! Requests are always non-streaming; a failed call is reported, never retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, TokenUsage};
use crate::config::LlmConfig;

/// Ollama API client
pub struct OllamaClient {
    host: String,
    http: Client,
    debug_render_only: bool,
}

impl OllamaClient {
    /// Create a client for `host` with the given HTTP timeout
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let host = host.into();
        debug!(%host, ?timeout, "OllamaClient::new: called");
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            http,
            debug_render_only: false,
        })
    }

    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(?config, "OllamaClient::from_config: called");
        Self::new(&config.host, Duration::from_millis(config.timeout_ms))
    }

    /// Ask the server to render the prompt instead of generating
    ///
    /// The rendered template comes back as the assistant's content with no
    /// tool calls, so an agent loop finishes after a single call.
    pub fn with_debug_render_only(mut self, enabled: bool) -> Self {
        self.debug_render_only = enabled;
        self
    }

    /// Build the request body for the Ollama API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(model = %request.model, message_count = %request.messages.len(), "build_request_body: called");
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": false,
        });

        if !request.tools.is_empty() {
            debug!(tool_count = %request.tools.len(), "build_request_body: adding tools");
            body["tools"] =
                serde_json::json!(request.tools.iter().map(|t| t.to_ollama_schema()).collect::<Vec<_>>());
        }

        if self.debug_render_only {
            body["_debug_render_only"] = serde_json::json!(true);
        }

        body
    }

    /// Parse the Ollama API response body
    fn parse_response(&self, text: &str) -> Result<CompletionResponse, LlmError> {
        debug!(body_len = %text.len(), "parse_response: called");
        if self.debug_render_only {
            debug!("parse_response: debug render only, returning raw body");
            return Ok(CompletionResponse::from_message(Message::assistant(text)));
        }

        let api_response: OllamaResponse =
            serde_json::from_str(text).map_err(|e| LlmError::InvalidResponse(format!("decode response: {}", e)))?;

        Ok(CompletionResponse {
            message: api_response.message,
            done: api_response.done,
            usage: TokenUsage {
                input_tokens: api_response.prompt_eval_count,
                output_tokens: api_response.eval_count,
            },
        })
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %request.model, "complete: called");
        let url = format!("{}/api/chat", self.host);
        let body = serde_json::to_vec(&self.build_request_body(&request))?;
        debug!(context_length = %body.len(), "complete: sending request");

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = %status.as_u16(), "complete: API error");
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        debug!("complete: success");
        self.parse_response(&text)
    }
}

// Ollama API response types

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: Message,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}
