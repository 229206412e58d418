//! write_file tool - create or overwrite a file

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{absolute_path, create_parent_dirs, existing_file_len};
use crate::llm::Arguments;
use crate::tools::traits::params;
use crate::tools::{Tool, ToolError};

/// Write content to a file, refusing to clobber unless asked
pub struct WriteFileTool;

#[derive(Debug, Serialize)]
struct WriteFileResult {
    path: String,
    operation: &'static str,
    size: u64,
    success: bool,
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file. Can create new files or overwrite existing ones."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["path", "content"],
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to write to"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                },
                "overwrite": {
                    "type": "boolean",
                    "description": "Whether to overwrite if file exists (default: false)"
                },
                "create_dirs": {
                    "type": "boolean",
                    "description": "Whether to create parent directories if they don't exist (default: true)"
                }
            }
        })
    }

    async fn execute(&self, args: &Arguments) -> Result<String, ToolError> {
        debug!("WriteFileTool::execute: called");
        let path = params::required_non_empty(args, "path")?;
        let content = params::required_str(args, "content")?;
        let overwrite = params::opt_bool(args, "overwrite").unwrap_or(false);
        let create_dirs = params::opt_bool(args, "create_dirs").unwrap_or(true);
        let abs = absolute_path(path)?;
        debug!(?abs, %overwrite, %create_dirs, content_len = %content.len(), "WriteFileTool::execute: parameters parsed");

        let existed = existing_file_len(&abs).await?.is_some();
        if existed && !overwrite {
            debug!("WriteFileTool::execute: file exists, overwrite not set");
            return Err(ToolError::Failed(
                "file already exists (use overwrite=true to replace)".to_string(),
            ));
        }

        if create_dirs {
            create_parent_dirs(&abs).await?;
        }

        tokio::fs::write(&abs, content)
            .await
            .map_err(|e| ToolError::io("cannot write file", e))?;
        let size = tokio::fs::metadata(&abs)
            .await
            .map_err(|e| ToolError::io("file written but cannot stat", e))?
            .len();

        let result = WriteFileResult {
            path: abs.display().to_string(),
            operation: if existed { "overwritten" } else { "created" },
            size,
            success: true,
        };
        debug!(operation = %result.operation, %size, "WriteFileTool::execute: written");
        Ok(serde_json::to_string(&result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    async fn write(value: Value) -> Result<Value, ToolError> {
        let text = WriteFileTool.execute(value.as_object().unwrap()).await?;
        Ok(serde_json::from_str(&text).unwrap())
    }

    #[tokio::test]
    async fn test_write_file_creates_with_parents() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("a/b/out.txt");

        let value = write(json!({"path": file.to_str().unwrap(), "content": "hello"}))
            .await
            .unwrap();

        assert_eq!(value["operation"], "created");
        assert_eq!(value["size"], 5);
        assert_eq!(value["success"], true);
        assert_eq!(fs::read_to_string(&file).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_write_file_refuses_existing_without_overwrite() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("keep.txt");
        fs::write(&file, "original").unwrap();

        let err = write(json!({"path": file.to_str().unwrap(), "content": "new"}))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("file already exists"));
        assert_eq!(fs::read_to_string(&file).unwrap(), "original");
    }

    #[tokio::test]
    async fn test_write_file_overwrites() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("replace.txt");
        fs::write(&file, "original").unwrap();

        let value = write(json!({"path": file.to_str().unwrap(), "content": "new", "overwrite": true}))
            .await
            .unwrap();

        assert_eq!(value["operation"], "overwritten");
        assert_eq!(fs::read_to_string(&file).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_write_file_without_create_dirs_fails_on_missing_parent() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("missing/out.txt");

        let err = write(json!({"path": file.to_str().unwrap(), "content": "x", "create_dirs": false}))
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("cannot write file: "));
    }

    #[tokio::test]
    async fn test_write_file_rejects_directory_and_bad_args() {
        let temp = tempdir().unwrap();

        let err = write(json!({"path": temp.path().to_str().unwrap(), "content": "x", "overwrite": true}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "path is a directory, not a file");

        let err = write(json!({"path": "", "content": "x"})).await.unwrap_err();
        assert_eq!(err.to_string(), "path must be a non-empty string");

        let err = write(json!({"path": "x.txt"})).await.unwrap_err();
        assert_eq!(err.to_string(), "content must be a string");
    }
}
