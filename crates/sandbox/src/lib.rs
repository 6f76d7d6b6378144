//! Sandbox module for burrow — path containment to the workspace root.
//!
//! This is lexical containment, not OS-level isolation: no namespaces,
//! chroot, or seccomp, and no symlink or TOCTOU defense.

pub mod path;

pub use path::{SandboxError, WorkspaceRoot};
