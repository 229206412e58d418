//! looptool configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the chat endpoint host
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Environment variable overriding the model name
pub const MODEL_ENV: &str = "OLLAMA_MODEL";

/// Main looptool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Chat endpoint configuration
    pub llm: LlmConfig,

    /// Agent loop configuration
    pub agent: AgentConfig,

    /// run_command tool policy
    pub commands: CommandsConfig,
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .looptool.yml
        let local_config = PathBuf::from(".looptool.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/looptool/looptool.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("looptool").join("looptool.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply OLLAMA_HOST / OLLAMA_MODEL when they are set and non-empty
    pub fn apply_env_overrides(&mut self) {
        if let Some(host) = non_empty_env(HOST_ENV) {
            tracing::debug!(%host, "Config::apply_env_overrides: host from environment");
            self.llm.host = host;
        }
        if let Some(model) = non_empty_env(MODEL_ENV) {
            tracing::debug!(%model, "Config::apply_env_overrides: model from environment");
            self.llm.model = model;
        }
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed; the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load_file_chain(config_path).ok().and_then(|c| c.log_level)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Chat endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Ollama server
    pub host: String,

    /// Model identifier
    pub model: String,

    /// HTTP request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "qwen3:latest".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Agent loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum model round-trips before giving up
    #[serde(rename = "max-iterations")]
    pub max_iterations: u32,

    /// System prompt seeded at the start of every conversation
    #[serde(rename = "system-prompt")]
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            system_prompt: "You are a helpful assistant with access to tools. Use them when needed.".to_string(),
        }
    }
}

/// run_command tool policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Ask the operator before running commands
    #[serde(rename = "require-confirmation")]
    pub require_confirmation: bool,

    /// Skip the prompt for commands that look read-only
    #[serde(rename = "auto-approve-reads")]
    pub auto_approve_reads: bool,

    /// Timeout applied when the model does not pass timeout_seconds
    #[serde(rename = "default-timeout-secs")]
    pub default_timeout_secs: u64,
}

impl CommandsConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            require_confirmation: true,
            auto_approve_reads: true,
            default_timeout_secs: 30,
        }
    }
}
