//! File read tool — bounded file content retrieval.

use async_trait::async_trait;
use burrow_core::error::ToolError;
use burrow_core::tool::{Tool, ToolResult};
use burrow_sandbox::WorkspaceRoot;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Character budget for a single read.
pub const MAX_CHARS: usize = 10_000;

/// Worst-case UTF-8 width of `MAX_CHARS + 1` characters. Reading this many
/// bytes is always enough to decide whether the file exceeds the budget,
/// so arbitrarily large files are never buffered whole.
const PROBE_BYTES: u64 = (MAX_CHARS as u64 + 1) * 4;

pub struct FileContentTool {
    root: WorkspaceRoot,
}

impl FileContentTool {
    pub fn new(root: WorkspaceRoot) -> Self {
        Self { root }
    }
}

/// Read at most the probe budget and split at the character limit.
/// Returns the retained text and whether the file had more content.
async fn read_bounded(path: &Path) -> std::io::Result<(String, bool)> {
    let file = tokio::fs::File::open(path).await?;
    let mut buf = Vec::new();
    file.take(PROBE_BYTES).read_to_end(&mut buf).await?;

    // Invalid sequences are replaced rather than failing the read.
    let mut text = String::from_utf8_lossy(&buf).into_owned();
    match text.char_indices().nth(MAX_CHARS) {
        Some((boundary, _)) => {
            text.truncate(boundary);
            Ok((text, true))
        }
        None => Ok((text, false)),
    }
}

#[async_trait]
impl Tool for FileContentTool {
    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Reads and returns the contents of a file relative to the working directory, truncating very large files"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to read, relative to the working directory"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let file_path = arguments["file_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file_path' argument".into()))?;

        let target = match self.root.resolve(file_path) {
            Ok(path) => path,
            Err(_) => {
                return Ok(ToolResult::error(format!(
                    "Error: Cannot read \"{file_path}\" as it is outside the permitted working directory"
                )));
            }
        };

        if !target.is_file() {
            return Ok(ToolResult::error(format!(
                "Error: File not found or is not a regular file: \"{file_path}\""
            )));
        }

        match read_bounded(&target).await {
            Ok((mut content, truncated)) => {
                if truncated {
                    content.push_str(&format!(
                        "[...File \"{file_path}\" truncated at {MAX_CHARS} characters]"
                    ));
                }
                Ok(ToolResult::ok(content))
            }
            Err(e) => Ok(ToolResult::error(format!("Error: {e}"))),
        }
    }
}
