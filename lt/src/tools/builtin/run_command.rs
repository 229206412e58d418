//! run_command tool - execute shell commands under a deadline

use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::llm::Arguments;
use crate::tools::traits::params;
use crate::tools::{Confirm, ConfirmationPolicy, ConfirmationRequest, Tool, ToolError};

/// How long pipe readers may keep draining once the process is gone
const PIPE_GRACE: Duration = Duration::from_millis(500);

/// Outcome of one command execution, serialized as the tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandExecutionResult {
    pub command: String,
    pub working_dir: String,
    pub stdout: String,
    pub stderr: String,
    /// -1 on timeout or when the process was killed by a signal
    pub exit_code: i32,
    pub duration_ms: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute a shell command, asking the operator first when policy requires
pub struct RunCommandTool {
    policy: ConfirmationPolicy,
    confirm: Arc<dyn Confirm>,
    default_timeout: Duration,
}

impl RunCommandTool {
    pub fn new(policy: ConfirmationPolicy, confirm: Arc<dyn Confirm>, default_timeout: Duration) -> Self {
        debug!(?policy, ?default_timeout, "RunCommandTool::new: called");
        Self {
            policy,
            confirm,
            default_timeout,
        }
    }

    fn timeout_from(&self, args: &Arguments) -> Result<Duration, ToolError> {
        match args.get("timeout_seconds") {
            None | Some(Value::Null) => Ok(self.default_timeout),
            Some(value) => {
                let secs = value
                    .as_f64()
                    .ok_or_else(|| ToolError::invalid("timeout_seconds must be a number"))?;
                if !secs.is_finite() || secs <= 0.0 {
                    return Err(ToolError::invalid("timeout_seconds must be a positive number"));
                }
                Duration::try_from_secs_f64(secs).map_err(|e| ToolError::invalid(format!("timeout_seconds: {}", e)))
            }
        }
    }

    async fn ask(&self, command: &str, working_dir: &str) -> bool {
        let request = ConfirmationRequest::new(command, working_dir);
        let confirm = Arc::clone(&self.confirm);
        // The prompt blocks on operator input
        match tokio::task::spawn_blocking(move || confirm.confirm(&request)).await {
            Ok(approved) => approved,
            Err(e) => {
                warn!(error = %e, "confirmation task failed, treating as denial");
                false
            }
        }
    }
}

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "run_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its output. Use this for running scripts, building projects, testing code, etc."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["command"],
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "working_dir": {
                    "type": "string",
                    "description": "The working directory to run the command in (default: current directory)"
                },
                "timeout_seconds": {
                    "type": "number",
                    "description": format!("Timeout in seconds (default: {})", self.default_timeout.as_secs_f64())
                }
            }
        })
    }

    async fn execute(&self, args: &Arguments) -> Result<String, ToolError> {
        debug!(?args, "RunCommandTool::execute: called");
        let command = params::required_non_empty(args, "command")?;
        let working_dir = params::opt_str(args, "working_dir").unwrap_or(".");
        let timeout = self.timeout_from(args)?;
        debug!(%command, %working_dir, ?timeout, "RunCommandTool::execute: parameters parsed");

        if self.policy.needs_confirmation(command) {
            debug!("RunCommandTool::execute: asking for confirmation");
            if !self.ask(command, working_dir).await {
                info!(%command, "command denied by operator");
                return Err(ToolError::PermissionDenied {
                    command: command.to_string(),
                });
            }
        } else {
            debug!("RunCommandTool::execute: no confirmation needed");
        }

        let result = run_shell(command, working_dir, timeout).await?;
        Ok(serde_json::to_string(&result)?)
    }
}

/// Run `sh -c <command>` in `working_dir`, killing it after `timeout`
///
/// A timeout is not an error: the result carries exit code -1, the error
/// "command timed out" and whatever output arrived before the kill.
pub async fn run_shell(command: &str, working_dir: &str, timeout: Duration) -> Result<CommandExecutionResult, ToolError> {
    debug!(%command, %working_dir, ?timeout, "run_shell: called");
    let start = Instant::now();

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true)
        .spawn()
        .map_err(ToolError::Spawn)?;
    debug!(pid = ?child.id(), "run_shell: spawned");

    let stdout = Arc::new(Mutex::new(Vec::new()));
    let stderr = Arc::new(Mutex::new(Vec::new()));
    let mut readers = Vec::with_capacity(2);
    if let Some(pipe) = child.stdout.take() {
        readers.push(tokio::spawn(drain(pipe, Arc::clone(&stdout))));
    }
    if let Some(pipe) = child.stderr.take() {
        readers.push(tokio::spawn(drain(pipe, Arc::clone(&stderr))));
    }

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(?status, "run_shell: command completed");
            Some(status)
        }
        Ok(Err(e)) => {
            debug!(%e, "run_shell: wait failed");
            kill_process_group(&mut child).await;
            return Err(ToolError::io("failed to wait for command", e));
        }
        Err(_) => {
            info!(%command, ?timeout, "command timed out, killing process group");
            kill_process_group(&mut child).await;
            None
        }
    };

    finish_readers(readers).await;
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (exit_code, error) = match status {
        Some(status) => (status_code(status), None),
        None => (-1, Some("command timed out".to_string())),
    };

    let result = CommandExecutionResult {
        command: command.to_string(),
        working_dir: working_dir.to_string(),
        stdout: snapshot(&stdout),
        stderr: snapshot(&stderr),
        exit_code,
        duration_ms,
        success: error.is_none() && exit_code == 0,
        error,
    };
    debug!(
        exit_code = %result.exit_code,
        stdout_len = %result.stdout.len(),
        stderr_len = %result.stderr.len(),
        %duration_ms,
        "run_shell: done"
    );
    Ok(result)
}

/// Signal-terminated processes have no exit code
fn status_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

async fn drain<R: AsyncRead + Unpin>(mut pipe: R, sink: Arc<Mutex<Vec<u8>>>) {
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => match sink.lock() {
                Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                Err(_) => break,
            },
            Err(e) => {
                debug!(%e, "drain: read failed");
                break;
            }
        }
    }
}

/// Wait briefly for the readers; a backgrounded grandchild may hold a pipe open
async fn finish_readers(readers: Vec<JoinHandle<()>>) {
    for mut reader in readers {
        if tokio::time::timeout(PIPE_GRACE, &mut reader).await.is_err() {
            debug!("finish_readers: reader still open, abandoning");
            reader.abort();
        }
    }
}

async fn kill_process_group(child: &mut Child) {
    if let Some(pid) = child.id() {
        // The shell leads its own group, so this reaches every descendant
        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            debug!(%e, "kill_process_group: killpg failed");
        }
    }
    if let Err(e) = child.kill().await {
        debug!(%e, "kill_process_group: kill failed");
    }
}

fn snapshot(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    buf.lock().map(|b| String::from_utf8_lossy(&b).into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FixedConfirm;
    use tempfile::tempdir;

    fn tool(policy: ConfirmationPolicy, confirm: Arc<FixedConfirm>) -> RunCommandTool {
        RunCommandTool::new(policy, confirm, Duration::from_secs(30))
    }

    fn unattended() -> RunCommandTool {
        tool(ConfirmationPolicy::unattended(), Arc::new(FixedConfirm::deny()))
    }

    fn arguments(value: Value) -> Arguments {
        value.as_object().cloned().unwrap()
    }

    async fn run(tool: &RunCommandTool, value: Value) -> Result<CommandExecutionResult, ToolError> {
        let text = tool.execute(&arguments(value)).await?;
        Ok(serde_json::from_str(&text).unwrap())
    }

    #[tokio::test]
    async fn test_run_command_basic() {
        let result = run(&unattended(), json!({"command": "echo hello"})).await.unwrap();

        assert_eq!(result.command, "echo hello");
        assert_eq!(result.working_dir, ".");
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
        assert_eq!(result.exit_code, 0);
        assert!(result.success);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_run_command_payload_omits_error_on_success() {
        let text = unattended()
            .execute(&arguments(json!({"command": "true"})))
            .await
            .unwrap();

        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["success"], true);
    }

    #[tokio::test]
    async fn test_run_command_in_working_dir() {
        let temp = tempdir().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "x").unwrap();
        let dir = temp.path().to_str().unwrap();

        let result = run(&unattended(), json!({"command": "ls", "working_dir": dir})).await.unwrap();

        assert!(result.stdout.contains("marker.txt"));
        assert_eq!(result.working_dir, dir);
    }

    #[tokio::test]
    async fn test_run_command_nonzero_exit() {
        let result = run(&unattended(), json!({"command": "echo oops >&2; exit 3"})).await.unwrap();

        assert_eq!(result.exit_code, 3);
        assert!(!result.success);
        assert_eq!(result.stderr, "oops\n");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_run_command_signal_exit_is_minus_one() {
        let result = run(&unattended(), json!({"command": "kill -9 $$"})).await.unwrap();

        assert_eq!(result.exit_code, -1);
        assert!(!result.success);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_run_command_timeout_keeps_partial_output() {
        let started = Instant::now();
        let result = run(
            &unattended(),
            json!({"command": "echo started; sleep 10", "timeout_seconds": 0.5}),
        )
        .await
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(result.exit_code, -1);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("command timed out"));
        assert_eq!(result.stdout, "started\n");
    }

    #[tokio::test]
    async fn test_run_command_timeout_kills_background_children() {
        let started = Instant::now();
        let result = run(
            &unattended(),
            json!({"command": "sleep 10 & sleep 10", "timeout_seconds": 0.3}),
        )
        .await
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(result.error.as_deref(), Some("command timed out"));
    }

    #[tokio::test]
    async fn test_run_command_invalid_arguments() {
        let tool = unattended();

        let err = run(&tool, json!({})).await.unwrap_err();
        assert_eq!(err.to_string(), "command must be a non-empty string");

        let err = run(&tool, json!({"command": ""})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument(_)));

        for bad in [json!(0), json!(-1), json!("soon")] {
            let err = run(&tool, json!({"command": "true", "timeout_seconds": bad})).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidArgument(_)), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_run_command_missing_working_dir_is_spawn_error() {
        let err = run(
            &unattended(),
            json!({"command": "true", "working_dir": "/definitely/not/here"}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ToolError::Spawn(_)));
        assert!(err.to_string().starts_with("failed to execute command"));
    }

    #[tokio::test]
    async fn test_read_only_command_skips_confirmation() {
        let confirm = Arc::new(FixedConfirm::deny());
        let tool = tool(ConfirmationPolicy::new(true, true), Arc::clone(&confirm));

        let result = run(&tool, json!({"command": "ls ."})).await.unwrap();

        assert!(result.success);
        assert_eq!(confirm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_denied_command_is_not_spawned() {
        let temp = tempdir().unwrap();
        let marker = temp.path().join("created");
        let confirm = Arc::new(FixedConfirm::deny());
        let tool = tool(ConfirmationPolicy::new(true, true), Arc::clone(&confirm));

        let command = format!("touch {}", marker.display());
        let err = run(&tool, json!({"command": &command, "working_dir": "/tmp"})).await.unwrap_err();

        assert!(matches!(err, ToolError::PermissionDenied { .. }));
        assert_eq!(err.to_string(), "command execution denied by user");
        assert!(!marker.exists());

        let requests = confirm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].command, command);
        assert_eq!(requests[0].working_dir, "/tmp");
    }

    #[tokio::test]
    async fn test_approved_command_runs() {
        let temp = tempdir().unwrap();
        let marker = temp.path().join("created");
        let confirm = Arc::new(FixedConfirm::approve());
        let tool = tool(ConfirmationPolicy::new(true, false), Arc::clone(&confirm));

        let command = format!("touch {}", marker.display());
        let result = run(&tool, json!({"command": &command})).await.unwrap();

        assert!(result.success);
        assert!(marker.exists());
        assert_eq!(confirm.call_count(), 1);
    }
}
