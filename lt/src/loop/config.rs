//! Agent loop configuration

use tracing::debug;

use crate::config::Config;

/// Settings for one agent loop run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// Model identifier sent with every request
    pub model: String,

    /// First message of every conversation
    pub system_prompt: String,

    /// Maximum model round-trips before giving up
    pub max_iterations: u32,
}

impl LoopConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        debug!("LoopConfig::default: called");
        let config = Config::default();
        Self::from(&config)
    }
}

impl From<&Config> for LoopConfig {
    fn from(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            system_prompt: config.agent.system_prompt.clone(),
            max_iterations: config.agent.max_iterations,
        }
    }
}
