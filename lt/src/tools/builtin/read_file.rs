//! read_file tool - read a text file up to a byte limit

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use tracing::debug;

use super::absolute_path;
use crate::llm::Arguments;
use crate::tools::traits::params;
use crate::tools::{Tool, ToolError};

const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;

/// Read the contents of a text file
pub struct ReadFileTool;

#[derive(Debug, Serialize)]
struct ReadFileResult {
    path: String,
    size: u64,
    read_size: usize,
    content: String,
    truncated: bool,
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a text file"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path"],
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to read"
                },
                "max_bytes": {
                    "type": "number",
                    "description": "Optional maximum number of bytes to read (default: 1MB)"
                }
            }
        })
    }

    async fn execute(&self, args: &Arguments) -> Result<String, ToolError> {
        debug!(?args, "ReadFileTool::execute: called");
        let path = params::required_str(args, "path")?;
        let max_bytes = params::opt_f64(args, "max_bytes")
            .map(|n| n.max(0.0) as u64)
            .unwrap_or(DEFAULT_MAX_BYTES);
        let abs = absolute_path(path)?;

        let meta = tokio::fs::metadata(&abs)
            .await
            .map_err(|e| ToolError::io("cannot access file", e))?;
        if meta.is_dir() {
            debug!("ReadFileTool::execute: path is a directory");
            return Err(ToolError::Failed("path is a directory, not a file".to_string()));
        }

        let file = tokio::fs::File::open(&abs)
            .await
            .map_err(|e| ToolError::io("cannot open file", e))?;
        let mut content = Vec::new();
        file.take(max_bytes)
            .read_to_end(&mut content)
            .await
            .map_err(|e| ToolError::io("cannot read file", e))?;
        debug!(size = %meta.len(), read_size = %content.len(), "ReadFileTool::execute: read");

        let result = ReadFileResult {
            path: abs.display().to_string(),
            size: meta.len(),
            read_size: content.len(),
            content: String::from_utf8_lossy(&content).into_owned(),
            truncated: meta.len() > max_bytes,
        };
        Ok(serde_json::to_string(&result)?)
    }
}
