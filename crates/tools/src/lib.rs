//! Sandboxed tool implementations for burrow.
//!
//! The four workspace capabilities the model can call: list a directory,
//! read a file, write a file, run a Python script. Every tool resolves
//! model-supplied paths through the shared [`WorkspaceRoot`], and every
//! operational failure comes back as an `"Error: ..."` result string so
//! the model can read it and adjust — nothing here throws past the
//! dispatch boundary.

pub mod file_content;
pub mod file_write;
pub mod files_info;
pub mod run_python;

use burrow_core::tool::ToolRegistry;
use burrow_sandbox::WorkspaceRoot;

pub use file_content::FileContentTool;
pub use file_write::FileWriteTool;
pub use files_info::FilesInfoTool;
pub use run_python::RunPythonTool;

/// Create the fixed registry of the four workspace tools, each confined
/// to the given root. The root is injected here, never named by the model.
pub fn workspace_registry(root: &WorkspaceRoot) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(FilesInfoTool::new(root.clone())));
    registry.register(Box::new(FileContentTool::new(root.clone())));
    registry.register(Box::new(FileWriteTool::new(root.clone())));
    registry.register(Box::new(RunPythonTool::new(root.clone())));
    registry
}
