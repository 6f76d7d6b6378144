//! Directory listing tool — enumerate workspace entries with sizes.

use async_trait::async_trait;
use burrow_core::error::ToolError;
use burrow_core::tool::{Tool, ToolResult};
use burrow_sandbox::WorkspaceRoot;

pub struct FilesInfoTool {
    root: WorkspaceRoot,
}

impl FilesInfoTool {
    pub fn new(root: WorkspaceRoot) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Tool for FilesInfoTool {
    fn name(&self) -> &str {
        "get_files_info"
    }

    fn description(&self) -> &str {
        "Lists files in the specified directory along with their sizes, constrained to the working directory"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "Directory to list, relative to the working directory (defaults to the working directory itself)"
                }
            }
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let directory = arguments["directory"].as_str().unwrap_or(".");

        let target = match self.root.resolve(directory) {
            Ok(path) => path,
            Err(_) => {
                return Ok(ToolResult::error(format!(
                    "Error: Cannot list \"{directory}\" as it is outside the permitted working directory"
                )));
            }
        };

        if !target.is_dir() {
            return Ok(ToolResult::error(format!(
                "Error: \"{directory}\" is not a directory"
            )));
        }

        let mut read_dir = match tokio::fs::read_dir(&target).await {
            Ok(rd) => rd,
            Err(e) => return Ok(ToolResult::error(format!("Error: {e}"))),
        };

        let mut names = Vec::new();
        loop {
            match read_dir.next_entry().await {
                Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
                Ok(None) => break,
                Err(e) => return Ok(ToolResult::error(format!("Error: {e}"))),
            }
        }
        // Deterministic output regardless of filesystem enumeration order
        names.sort();

        let mut items = Vec::with_capacity(names.len());
        for name in names {
            let path = target.join(&name);
            match tokio::fs::metadata(&path).await {
                Ok(meta) => {
                    items.push(format!(
                        "- {name}: file_size={} bytes, is_dir={}",
                        meta.len(),
                        meta.is_dir()
                    ));
                }
                // One unreadable entry aborts the whole listing
                Err(e) => return Ok(ToolResult::error(format!("Error: {e}"))),
            }
        }

        Ok(ToolResult::ok(items.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_in(dir: &tempfile::TempDir) -> FilesInfoTool {
        FilesInfoTool::new(WorkspaceRoot::new(dir.path()).unwrap())
    }

    #[tokio::test]
    async fn lists_entries_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "bb").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::create_dir(dir.path().join("C")).unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({}))
            .await
            .unwrap();

        assert!(result.success);
        let lines: Vec<&str> = result.output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("- C:"));
        assert!(lines[1].starts_with("- a.txt:"));
        assert!(lines[2].starts_with("- b.txt:"));
        assert!(lines[0].contains("is_dir=true"));
        assert!(lines[1].contains("file_size=1 bytes"));
        assert!(lines[1].contains("is_dir=false"));
    }

    #[tokio::test]
    async fn defaults_to_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("only.txt"), "x").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({}))
            .await
            .unwrap();
        assert!(result.output.contains("only.txt"));
    }

    #[tokio::test]
    async fn subdirectory_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg").join("mod.py"), "pass").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"directory": "pkg"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("mod.py"));
    }

    #[tokio::test]
    async fn escape_attempt_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool_in(&dir)
            .execute(serde_json::json!({"directory": "../"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.output,
            "Error: Cannot list \"../\" as it is outside the permitted working directory"
        );
    }

    #[tokio::test]
    async fn non_directory_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.txt"), "x").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"directory": "plain.txt"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.output, "Error: \"plain.txt\" is not a directory");
    }
}
