//! Built-in tools for the agent loop

mod append_file;
mod grep;
mod list_files;
mod mock;
mod read_file;
mod read_only;
mod run_command;
mod write_file;

pub use append_file::AppendFileTool;
pub use grep::GrepTool;
pub use list_files::ListFilesTool;
pub use mock::register_demo_tools;
pub use read_file::ReadFileTool;
pub use read_only::is_read_only_command;
pub use run_command::{CommandExecutionResult, RunCommandTool, run_shell};
pub use write_file::WriteFileTool;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{Confirm, ConfirmationPolicy, ToolError, ToolRegistry};

/// Build the registry the `lt` binary advertises
///
/// Order: the demo tools, the filesystem tools, then run_command.
pub fn standard_registry(
    policy: ConfirmationPolicy,
    confirm: Arc<dyn Confirm>,
    default_timeout: Duration,
) -> Result<ToolRegistry, ToolError> {
    debug!(?policy, ?default_timeout, "standard_registry: called");
    let mut registry = ToolRegistry::new();
    register_demo_tools(&mut registry)?;
    registry.register(ListFilesTool)?;
    registry.register(ReadFileTool)?;
    registry.register(GrepTool)?;
    registry.register(WriteFileTool)?;
    registry.register(AppendFileTool)?;
    registry.register(RunCommandTool::new(policy, confirm, default_timeout))?;
    Ok(registry)
}

/// Lexically absolute form of `path` (symlinks are not resolved)
fn absolute_path(path: &str) -> Result<PathBuf, ToolError> {
    std::path::absolute(path).map_err(|e| ToolError::io("invalid path", e))
}

/// Size of the regular file at `path`, or None if nothing is there
async fn existing_file_len(path: &Path) -> Result<Option<u64>, ToolError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Err(ToolError::Failed("path is a directory, not a file".to_string())),
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ToolError::io("cannot access path", e)),
    }
}

async fn create_parent_dirs(path: &Path) -> Result<(), ToolError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolError::io("cannot create directories", e))?;
    }
    Ok(())
}
