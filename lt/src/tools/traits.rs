//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::ToolError;
use crate::llm::{Arguments, ToolDefinition};

/// A tool that can be called by the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the function name in tool calls)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool, returning the text handed back to the model
    async fn execute(&self, args: &Arguments) -> Result<String, ToolError>;

    /// Definition advertised to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// Signature of a plain function handler
pub type HandlerFn = dyn Fn(&Arguments) -> Result<String, ToolError> + Send + Sync;

/// A tool backed by a synchronous closure
pub struct FnTool {
    name: String,
    description: String,
    schema: Value,
    handler: Box<HandlerFn>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, schema: Value, handler: F) -> Self
    where
        F: Fn(&Arguments) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(%name, "FnTool::new: called");
        Self {
            name,
            description: description.into(),
            schema,
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, args: &Arguments) -> Result<String, ToolError> {
        debug!(name = %self.name, "FnTool::execute: called");
        (self.handler)(args)
    }
}

/// Argument accessors shared by the built-in tools
///
/// Numbers arrive as JSON numbers (floats or integers); anything of the wrong
/// type is treated the same as a missing value unless the parameter is required.
pub(crate) mod params {
    use super::*;

    /// Required string parameter
    pub fn required_str<'a>(args: &'a Arguments, key: &str) -> Result<&'a str, ToolError> {
        args.get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::invalid(format!("{} must be a string", key)))
    }

    /// Required string parameter that may not be empty
    pub fn required_non_empty<'a>(args: &'a Arguments, key: &str) -> Result<&'a str, ToolError> {
        match args.get(key).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(ToolError::invalid(format!("{} must be a non-empty string", key))),
        }
    }

    /// Optional string parameter; empty strings count as absent
    pub fn opt_str<'a>(args: &'a Arguments, key: &str) -> Option<&'a str> {
        args.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    pub fn opt_f64(args: &Arguments, key: &str) -> Option<f64> {
        args.get(key).and_then(Value::as_f64)
    }

    pub fn opt_bool(args: &Arguments, key: &str) -> Option<bool> {
        args.get(key).and_then(Value::as_bool)
    }
}
