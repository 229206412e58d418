//! append_file tool - append to a file, creating it if allowed

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{absolute_path, create_parent_dirs, existing_file_len};
use crate::llm::Arguments;
use crate::tools::traits::params;
use crate::tools::{Tool, ToolError};

/// Append content to a file
pub struct AppendFileTool;

#[derive(Debug, Serialize)]
struct AppendFileResult {
    path: String,
    operation: &'static str,
    bytes_written: usize,
    size_before: u64,
    size_after: u64,
    success: bool,
}

#[async_trait]
impl Tool for AppendFileTool {
    fn name(&self) -> &str {
        "append_file"
    }

    fn description(&self) -> &str {
        "Append content to an existing file or create a new file if it doesn't exist. Useful for adding to logs, updating lists, or incrementally building files."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path", "content"],
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to append to"
                },
                "content": {
                    "type": "string",
                    "description": "The content to append to the file"
                },
                "newline_before": {
                    "type": "boolean",
                    "description": "Whether to add a newline before the content (default: true)"
                },
                "create_if_missing": {
                    "type": "boolean",
                    "description": "Whether to create the file if it doesn't exist (default: true)"
                },
                "create_dirs": {
                    "type": "boolean",
                    "description": "Whether to create parent directories if they don't exist (default: true)"
                }
            }
        })
    }

    async fn execute(&self, args: &Arguments) -> Result<String, ToolError> {
        debug!("AppendFileTool::execute: called");
        let path = params::required_non_empty(args, "path")?;
        let content = params::required_str(args, "content")?;
        let newline_before = params::opt_bool(args, "newline_before").unwrap_or(true);
        let create_if_missing = params::opt_bool(args, "create_if_missing").unwrap_or(true);
        let create_dirs = params::opt_bool(args, "create_dirs").unwrap_or(true);
        let abs = absolute_path(path)?;
        debug!(?abs, %newline_before, %create_if_missing, %create_dirs, "AppendFileTool::execute: parameters parsed");

        let existing = existing_file_len(&abs).await?;
        if existing.is_none() && !create_if_missing {
            return Err(ToolError::Failed(
                "file does not exist and create_if_missing is false".to_string(),
            ));
        }
        let size_before = existing.unwrap_or(0);

        if create_dirs {
            create_parent_dirs(&abs).await?;
        }

        // Separate from existing content only when there is some
        let data = if newline_before && size_before > 0 {
            format!("\n{}", content)
        } else {
            content.to_string()
        };

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&abs)
            .await
            .map_err(|e| ToolError::io("cannot open file for appending", e))?;
        file.write_all(data.as_bytes())
            .await
            .map_err(|e| ToolError::io("cannot write to file", e))?;
        file.flush().await.map_err(|e| ToolError::io("cannot write to file", e))?;

        let size_after = tokio::fs::metadata(&abs)
            .await
            .map_err(|e| ToolError::io("file written but cannot stat", e))?
            .len();

        let result = AppendFileResult {
            path: abs.display().to_string(),
            operation: if existing.is_some() { "appended" } else { "created" },
            bytes_written: data.len(),
            size_before,
            size_after,
            success: true,
        };
        debug!(operation = %result.operation, bytes_written = %result.bytes_written, "AppendFileTool::execute: appended");
        Ok(serde_json::to_string(&result)?)
    }
}
