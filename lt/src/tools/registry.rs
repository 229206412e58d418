//! ToolRegistry - tool schemas and dispatch by name

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::{FnTool, Tool, ToolError};
use crate::llm::{Arguments, ToolDefinition};

/// Holds the tools available to an agent loop
///
/// Built once at startup and read-only afterwards. Schemas are advertised in
/// registration order; names are unique.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        debug!("ToolRegistry::new: called");
        Self::default()
    }

    /// Add a tool to the registry
    ///
    /// Fails with `DuplicateTool` if the name is taken; the registry is unchanged.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), ToolError> {
        self.register_boxed(Box::new(tool))
    }

    /// Add an already boxed tool to the registry
    pub fn register_boxed(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        debug!(%name, "ToolRegistry::register: called");
        if self.index.contains_key(&name) {
            debug!(%name, "ToolRegistry::register: duplicate name");
            return Err(ToolError::DuplicateTool { name });
        }

        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Register a closure as a tool
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: F,
    ) -> Result<(), ToolError>
    where
        F: Fn(&Arguments) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        self.register(FnTool::new(name, description, parameters, handler))
    }

    /// Tool definitions for the model, in registration order
    pub fn schemas(&self) -> Vec<ToolDefinition> {
        debug!(count = %self.tools.len(), "ToolRegistry::schemas: called");
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Execute a tool by name
    ///
    /// Returns `UnknownTool` for unregistered names; otherwise the handler's
    /// own result or error, unchanged.
    pub async fn execute(&self, name: &str, args: &Arguments) -> Result<String, ToolError> {
        debug!(%name, "ToolRegistry::execute: called");
        match self.index.get(name) {
            Some(&idx) => {
                debug!("ToolRegistry::execute: tool found, executing");
                self.tools[idx].execute(args).await
            }
            None => {
                debug!("ToolRegistry::execute: unknown tool");
                Err(ToolError::UnknownTool { name: name.to_string() })
            }
        }
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool names, in registration order
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
