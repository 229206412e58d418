//! lt - CLI entry point for the agent loop

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use looptool::cli::Cli;
use looptool::config::Config;
use looptool::llm::create_client;
use looptool::r#loop::{AgentLoop, LoopConfig};
use looptool::tools::builtin::standard_registry;
use looptool::tools::{ConfirmationPolicy, TerminalConfirm};

fn parse_level(level: Option<&str>) -> tracing::Level {
    match level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > INFO
    let level = parse_level(cli_log_level.or(config_log_level));

    // stdout carries the answer and the confirmation prompt
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("{}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// CLI flags win over config file and environment
fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    debug!("apply_cli_overrides: called");
    if let Some(host) = &cli.host {
        config.llm.host = host.clone();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.llm.timeout_ms = secs.saturating_mul(1000);
    }
    if let Some(max_iterations) = cli.max_iterations {
        config.agent.max_iterations = max_iterations;
    }
    if let Some(confirm) = cli.confirm {
        config.commands.require_confirmation = confirm;
    }
    if let Some(auto_approve_reads) = cli.auto_approve_reads {
        config.commands.auto_approve_reads = auto_approve_reads;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_cli_overrides(&mut config, &cli);
    info!("using {} from {}", config.llm.model, config.llm.host);

    let policy = ConfirmationPolicy::from(&config.commands);
    let registry = standard_registry(
        policy,
        Arc::new(TerminalConfirm::stdio()),
        config.commands.default_timeout(),
    )
    .context("Failed to register tools")?;

    if cli.dump_tools {
        debug!("main: dumping tools");
        let schemas: Vec<_> = registry.schemas().iter().map(|d| d.to_ollama_schema()).collect();
        println!("{}", serde_json::to_string(&schemas)?);
        return Ok(());
    }

    let client = create_client(&config.llm, cli.debug_render_only).context("Failed to create chat client")?;
    let agent = AgentLoop::new(client, Arc::new(registry), LoopConfig::from(&config));

    info!("user: {}", cli.message);
    let outcome = agent.run(&cli.message).await.context("Agent loop failed")?;
    info!(
        iterations = %outcome.iterations,
        input_tokens = %outcome.usage.input_tokens,
        output_tokens = %outcome.usage.output_tokens,
        "agent loop finished"
    );

    println!("{} {}", "assistant:".green().bold(), outcome.answer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(None), tracing::Level::INFO);
        assert_eq!(parse_level(Some("debug")), tracing::Level::DEBUG);
        assert_eq!(parse_level(Some("Warning")), tracing::Level::WARN);
        assert_eq!(parse_level(Some("loud")), tracing::Level::INFO);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "lt",
            "--host",
            "http://gpu:11434",
            "--confirm",
            "false",
            "-T",
            "5",
            "--max-iterations",
            "2",
        ])
        .unwrap();
        let mut config = Config::default();

        apply_cli_overrides(&mut config, &cli);

        assert_eq!(config.llm.host, "http://gpu:11434");
        assert_eq!(config.llm.model, "qwen3:latest");
        assert_eq!(config.llm.timeout_ms, 5000);
        assert_eq!(config.agent.max_iterations, 2);
        assert!(!config.commands.require_confirmation);
        assert!(config.commands.auto_approve_reads);
    }
}
