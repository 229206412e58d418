//! list_files tool - list the entries of one directory

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use super::absolute_path;
use crate::llm::Arguments;
use crate::tools::traits::params;
use crate::tools::{Tool, ToolError};

/// List files and directories in a path (not recursive)
pub struct ListFilesTool;

#[derive(Debug, Serialize)]
struct ListFilesResult {
    path: String,
    count: usize,
    files: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
struct FileEntry {
    name: String,
    is_dir: bool,
    #[serde(skip_serializing_if = "is_zero")]
    size: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files and directories in a given path"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path"],
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The directory path to list. Use '.' for current directory"
                }
            }
        })
    }

    async fn execute(&self, args: &Arguments) -> Result<String, ToolError> {
        debug!(?args, "ListFilesTool::execute: called");
        let path = params::required_str(args, "path")?;
        let abs = absolute_path(path)?;

        let mut dir = tokio::fs::read_dir(&abs)
            .await
            .map_err(|e| ToolError::io("cannot read directory", e))?;

        let mut files = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ToolError::io("cannot read directory", e))?
        {
            // Entries that vanish or cannot be stat'ed are skipped
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) => {
                    debug!(name = ?entry.file_name(), %e, "ListFilesTool::execute: skipping entry");
                    continue;
                }
            };
            files.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: meta.is_dir(),
                size: meta.len(),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = %files.len(), "ListFilesTool::execute: listed");

        let result = ListFilesResult {
            path: abs.display().to_string(),
            count: files.len(),
            files,
        };
        Ok(serde_json::to_string(&result)?)
    }
}
