//! Operator confirmation for command execution

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use colored::Colorize;
use tracing::{debug, warn};

use super::builtin::is_read_only_command;
use crate::config::CommandsConfig;

/// What the operator is asked to approve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub command: String,
    pub working_dir: String,
}

impl ConfirmationRequest {
    pub fn new(command: impl Into<String>, working_dir: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
        }
    }
}

/// Capability to ask the operator whether a command may run
///
/// Blocks until an answer is available. Returns true only on approval.
pub trait Confirm: Send + Sync {
    fn confirm(&self, request: &ConfirmationRequest) -> bool;
}

/// True for `y` / `yes`, ignoring case and surrounding whitespace
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompts on a writer and reads one line of answer from a reader
pub struct TerminalConfirm<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl TerminalConfirm<BufReader<Stdin>, Stdout> {
    /// Prompt on stdout, answer from stdin
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> TerminalConfirm<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    fn prompt(&self, request: &ConfirmationRequest) -> io::Result<String> {
        {
            let mut out = self.output.lock().map_err(|_| io::Error::other("output lock poisoned"))?;
            writeln!(out)?;
            writeln!(out, "{}", "The agent wants to run a command:".yellow().bold())?;
            writeln!(out, "   Command: {}", request.command)?;
            writeln!(out, "   Working Dir: {}", request.working_dir)?;
            writeln!(out)?;
            write!(out, "Allow this command? [y/N]: ")?;
            out.flush()?;
        }

        let mut line = String::new();
        let mut input = self.input.lock().map_err(|_| io::Error::other("input lock poisoned"))?;
        let read = input.read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no answer on input"));
        }
        Ok(line)
    }
}

impl<R, W> Confirm for TerminalConfirm<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn confirm(&self, request: &ConfirmationRequest) -> bool {
        debug!(command = %request.command, "TerminalConfirm::confirm: called");
        match self.prompt(request) {
            Ok(answer) => {
                let approved = is_affirmative(&answer);
                debug!(%approved, "TerminalConfirm::confirm: answered");
                approved
            }
            Err(e) => {
                warn!(error = %e, "confirmation failed, treating as denial");
                false
            }
        }
    }
}

/// Gives the same answer every time and records what it was asked
///
/// Used where no operator is present and in tests.
#[derive(Debug, Default)]
pub struct FixedConfirm {
    answer: bool,
    calls: AtomicUsize,
    requests: Mutex<Vec<ConfirmationRequest>>,
}

impl FixedConfirm {
    pub fn approve() -> Self {
        Self {
            answer: true,
            ..Self::default()
        }
    }

    pub fn deny() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ConfirmationRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Confirm for FixedConfirm {
    fn confirm(&self, request: &ConfirmationRequest) -> bool {
        debug!(command = %request.command, answer = %self.answer, "FixedConfirm::confirm: called");
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.answer
    }
}

/// When the operator must be asked before a command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub require_confirmation: bool,
    pub auto_approve_reads: bool,
}

impl ConfirmationPolicy {
    pub fn new(require_confirmation: bool, auto_approve_reads: bool) -> Self {
        Self {
            require_confirmation,
            auto_approve_reads,
        }
    }

    /// Never ask
    pub fn unattended() -> Self {
        Self::new(false, false)
    }

    pub fn needs_confirmation(&self, command: &str) -> bool {
        if !self.require_confirmation {
            return false;
        }
        !(self.auto_approve_reads && is_read_only_command(command))
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl From<&CommandsConfig> for ConfirmationPolicy {
    fn from(config: &CommandsConfig) -> Self {
        Self::new(config.require_confirmation, config.auto_approve_reads)
    }
}
