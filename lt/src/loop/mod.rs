//! Agent loop for looptool
//!
//! One run is a conversation: system prompt and user message in, then
//! model → tools → model until the model answers without calling tools or
//! the iteration budget runs out.

mod config;
mod engine;

pub use config::LoopConfig;
pub use engine::{AgentError, AgentLoop, AgentOutcome};
