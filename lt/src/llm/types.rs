//! Chat request/response types
//!
//! These mirror the Ollama `/api/chat` wire format closely: a conversation is a
//! flat list of role-tagged messages, and assistant messages may carry tool calls.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Tool call arguments: a mapping from parameter name to arbitrary JSON
pub type Arguments = Map<String, Value>;

/// A completion request - everything needed for one transport call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "qwen3:latest")
    pub model: String,

    /// Full conversation so far, system message first
    pub messages: Vec<Message>,

    /// Tools advertised to the model, in registration order
    pub tools: Vec<ToolDefinition>,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        debug!("Message::system: called");
        Self::text(Role::System, text)
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self::text(Role::User, text)
    }

    /// Create an assistant message with text content
    pub fn assistant(text: impl Into<String>) -> Self {
        debug!("Message::assistant: called");
        Self::text(Role::Assistant, text)
    }

    /// Create an assistant message requesting tool calls
    pub fn assistant_with_tools(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        debug!(tool_count = %tool_calls.len(), "Message::assistant_with_tools: called");
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_calls,
        }
    }

    /// Create a tool-result message
    pub fn tool(text: impl Into<String>) -> Self {
        debug!("Message::tool: called");
        Self::text(Role::Tool, text)
    }

    fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: text.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Whether this message asks for tools to be run
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a tool call for `name` with the given arguments
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    /// Name of the requested tool
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Arguments supplied by the model
    pub fn arguments(&self) -> &Arguments {
        &self.function.arguments
    }
}

/// Function name and arguments of a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,

    #[serde(default, deserialize_with = "arguments_from_object_or_string")]
    pub arguments: Arguments,
}

/// Ollama sends arguments as an object; OpenAI-compatible servers send a JSON string.
fn arguments_from_object_or_string<'de, D>(deserializer: D) -> Result<Arguments, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Arguments::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Arguments::new()),
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(de::Error::custom(format!(
                "tool arguments must be a JSON object, got {}",
                other
            ))),
            Err(e) => Err(de::Error::custom(format!("tool arguments are not valid JSON: {}", e))),
        },
        other => Err(de::Error::custom(format!(
            "tool arguments must be a JSON object, got {}",
            other
        ))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ToolCall>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ToolCall>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The assistant's message: either a final answer or a set of tool calls
    pub message: Message,

    /// Whether the server reported the generation as finished
    pub done: bool,

    /// Token usage reported by the server
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Build a response around an assistant message
    pub fn from_message(message: Message) -> Self {
        Self {
            message,
            done: true,
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage for a request (or accumulated over a loop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    /// Add another request's usage to this total
    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Tool definition advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        let name = name.into();
        let description = description.into();
        debug!(%name, "ToolDefinition::new: called");
        Self {
            name,
            description,
            parameters,
        }
    }

    /// Convert to the Ollama/OpenAI function-tool schema format
    pub fn to_ollama_schema(&self) -> Value {
        debug!(%self.name, "ToolDefinition::to_ollama_schema: called");
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}
