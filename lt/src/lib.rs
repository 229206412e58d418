//! looptool - a minimal tool-calling agent loop
//!
//! Sends a conversation and a set of tool schemas to a chat model, runs the
//! tools the model asks for, feeds the results back, and repeats until the
//! model answers in plain text or the iteration budget is spent.
//!
//! # Modules
//!
//! - [`llm`] - chat transport trait and the Ollama implementation
//! - [`tools`] - tool registry, confirmation, and built-in tools
//! - [`r#loop`] - the agent loop
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod llm;
pub mod tools;

#[path = "loop/mod.rs"]
pub mod r#loop;

pub use config::Config;
pub use llm::{LlmClient, LlmError};
pub use r#loop::{AgentError, AgentLoop, AgentOutcome, LoopConfig};
pub use tools::{Tool, ToolError, ToolRegistry};
