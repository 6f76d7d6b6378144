//! File write tool — create or overwrite workspace files.

use async_trait::async_trait;
use burrow_core::error::ToolError;
use burrow_core::tool::{Tool, ToolResult};
use burrow_sandbox::WorkspaceRoot;

pub struct FileWriteTool {
    root: WorkspaceRoot,
}

impl FileWriteTool {
    pub fn new(root: WorkspaceRoot) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file relative to the working directory, creating parent directories and overwriting existing files"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to write, relative to the working directory"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let file_path = arguments["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_path' argument".into()))?;

        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        let target = match self.root.resolve(file_path) {
            Ok(path) => path,
            Err(_) => {
                return Ok(ToolResult::error(format!(
                    "Error: Cannot write to \"{file_path}\" as it is outside the permitted working directory"
                )));
            }
        };

        if target.is_dir() {
            return Ok(ToolResult::error(format!(
                "Error: Cannot write to \"{file_path}\" as it is a directory"
            )));
        }

        if let Some(parent) = target.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            return Ok(ToolResult::error(format!("Error: {e}")));
        }

        match tokio::fs::write(&target, content).await {
            Ok(()) => Ok(ToolResult::ok(format!(
                "Successfully wrote to \"{file_path}\" ({} characters written)",
                content.chars().count()
            ))),
            Err(e) => Ok(ToolResult::error(format!("Error: {e}"))),
        }
    }
}
