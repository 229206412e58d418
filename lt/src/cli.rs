//! CLI definitions

use clap::Parser;
use std::path::PathBuf;

/// Default question when no message is given
pub const DEFAULT_MESSAGE: &str = "what is the weather in rijeka? what is 2 + 2?";

/// lt - minimal tool-calling agent loop for local chat models
#[derive(Debug, Parser)]
#[command(
    name = "lt",
    about = "Minimal tool-calling agent loop for local chat models",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)")]
    pub log_level: Option<String>,

    /// Message to send to the model
    #[arg(short, long, default_value = DEFAULT_MESSAGE)]
    pub message: String,

    /// Ask before running commands (overrides config)
    #[arg(long, value_name = "BOOL")]
    pub confirm: Option<bool>,

    /// Run read-only commands without asking (overrides config)
    #[arg(long = "auto-approve-reads", value_name = "BOOL")]
    pub auto_approve_reads: Option<bool>,

    /// HTTP timeout for chat requests, in seconds (overrides config)
    #[arg(short = 'T', long = "timeout", value_name = "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Maximum model round-trips (overrides config)
    #[arg(long = "max-iterations", value_name = "N")]
    pub max_iterations: Option<u32>,

    /// Model name (overrides config and OLLAMA_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// Ollama base URL (overrides config and OLLAMA_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Print the tool schemas as JSON and exit
    #[arg(short = 't', long = "dump-tools")]
    pub dump_tools: bool,

    /// Ask the server to render the prompt instead of generating
    #[arg(short = 'd', long = "debug-render-only")]
    pub debug_render_only: bool,
}
