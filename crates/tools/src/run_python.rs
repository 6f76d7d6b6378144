//! Python execution tool — run workspace scripts with a wall-clock bound.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use burrow_core::error::ToolError;
use burrow_core::tool::{Tool, ToolResult};
use burrow_sandbox::WorkspaceRoot;
use tokio::process::Command;
use tracing::debug;

/// Wall-clock bound on one script execution.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RunPythonTool {
    root: WorkspaceRoot,
    timeout: Duration,
}

impl RunPythonTool {
    pub fn new(root: WorkspaceRoot) -> Self {
        Self {
            root,
            timeout: SCRIPT_TIMEOUT,
        }
    }

    /// Override the execution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Assemble the report from exit status and captured output.
    fn build_report(exit_code: Option<i32>, stdout: &str, stderr: &str) -> String {
        let mut parts = Vec::new();
        if exit_code != Some(0) {
            parts.push(format!(
                "Process exited with code {}",
                exit_code.unwrap_or(-1)
            ));
        }
        if stdout.is_empty() && stderr.is_empty() {
            parts.push("No output produced".into());
        } else {
            if !stdout.is_empty() {
                parts.push(format!("STDOUT:\n{}", stdout.trim_end()));
            }
            if !stderr.is_empty() {
                parts.push(format!("STDERR:\n{}", stderr.trim_end()));
            }
        }
        parts.join("\n")
    }
}

#[async_trait]
impl Tool for RunPythonTool {
    fn name(&self) -> &str {
        "run_python_file"
    }

    fn description(&self) -> &str {
        "Executes a Python file located in the working directory and returns stdout/stderr and exit code"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the Python file to execute, relative to the working directory"
                },
                "args": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional list of string arguments to pass to the Python program"
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

        let args: Vec<String> = match &arguments["args"] {
            serde_json::Value::Null => Vec::new(),
            serde_json::Value::Array(values) => values
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            other => {
                return Err(ToolError::InvalidArguments(format!(
                    "'args' must be an array of strings, got {other}"
                )));
            }
        };

        let target = match self.root.resolve(file_path) {
            Ok(path) => path,
            Err(_) => {
                return Ok(ToolResult::error(format!(
                    "Error: Cannot execute \"{file_path}\" as it is outside the permitted working directory"
                )));
            }
        };

        if !target.is_file() {
            return Ok(ToolResult::error(format!(
                "Error: \"{file_path}\" does not exist or is not a regular file"
            )));
        }

        if !file_path.to_lowercase().ends_with(".py") {
            return Ok(ToolResult::error(format!(
                "Error: \"{file_path}\" is not a Python file"
            )));
        }

        debug!(script = %file_path, args = args.len(), "Executing Python file");

        // The script runs with the workspace root as cwd so its own
        // relative file access stays consistent with the sandbox.
        let mut command = Command::new("python3");
        command
            .arg(&target)
            .args(&args)
            .current_dir(self.root.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Timeout expiry drops the wait future; this turns that drop
            // into a kill instead of an abandoned child.
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                return Ok(ToolResult::error(format!(
                    "Error: executing Python file: {e}"
                )));
            }
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                let report = Self::build_report(output.status.code(), &stdout, &stderr);
                Ok(ToolResult {
                    success: output.status.success(),
                    output: report,
                })
            }
            Ok(Err(e)) => Ok(ToolResult::error(format!(
                "Error: executing Python file: {e}"
            ))),
            Err(_) => Ok(ToolResult::error(format!(
                "Error: executing Python file: timed out after {} seconds",
                self.timeout.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn tool_in(dir: &tempfile::TempDir) -> RunPythonTool {
        RunPythonTool::new(WorkspaceRoot::new(dir.path()).unwrap())
    }

    #[tokio::test]
    async fn runs_script_and_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hello.py"), "print('hello out')").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "hello.py"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "STDOUT:\nhello out");
    }

    #[tokio::test]
    async fn passes_arguments_through() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("echo.py"),
            "import sys\nprint(' '.join(sys.argv[1:]))",
        )
        .unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "echo.py", "args": ["alpha", "beta"]}))
            .await
            .unwrap();
        assert!(result.output.contains("alpha beta"));
    }

    #[tokio::test]
    async fn captures_stderr_separately() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("both.py"),
            "import sys\nprint('to out')\nprint('to err', file=sys.stderr)",
        )
        .unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "both.py"}))
            .await
            .unwrap();
        assert!(result.output.contains("STDOUT:\nto out"));
        assert!(result.output.contains("STDERR:\nto err"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fail.py"), "import sys\nsys.exit(3)").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "fail.py"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Process exited with code 3"));
        assert!(result.output.contains("No output produced"));
    }

    #[tokio::test]
    async fn silent_script_reports_no_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quiet.py"), "x = 1").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "quiet.py"}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "No output produced");
    }

    #[tokio::test]
    async fn script_cwd_is_the_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "found me").unwrap();
        std::fs::write(
            dir.path().join("readrel.py"),
            "print(open('marker.txt').read())",
        )
        .unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "readrel.py"}))
            .await
            .unwrap();
        assert!(result.output.contains("found me"));
    }

    #[tokio::test]
    async fn escape_attempt_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "../outside.py"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.output,
            "Error: Cannot execute \"../outside.py\" as it is outside the permitted working directory"
        );
    }

    #[tokio::test]
    async fn missing_script_is_a_conversational_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "ghost.py"}))
            .await
            .unwrap();
        assert_eq!(
            result.output,
            "Error: \"ghost.py\" does not exist or is not a regular file"
        );
    }

    #[tokio::test]
    async fn non_python_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("script.sh"), "echo hi").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "script.sh"}))
            .await
            .unwrap();
        assert_eq!(result.output, "Error: \"script.sh\" is not a Python file");
    }

    #[tokio::test]
    async fn uppercase_extension_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CAPS.PY"), "print('ok')").unwrap();

        let result = tool_in(&dir)
            .execute(serde_json::json!({"file_path": "CAPS.PY"}))
            .await
            .unwrap();
        assert!(result.success);
    }

    #[tokio::test]
    async fn overlong_script_times_out_without_hanging() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sleepy.py"),
            "import time\ntime.sleep(30)\nprint('never')",
        )
        .unwrap();

        let tool = tool_in(&dir).with_timeout(Duration::from_secs(1));
        let start = Instant::now();
        let result = tool
            .execute(serde_json::json!({"file_path": "sleepy.py"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.output.contains("timed out after 1 seconds"));
        // Bounded margin over the timeout, nowhere near the sleep length
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
