//! Workspace - global build settings.
//!
//! The workspace is the root every relative path in the configuration is
//! resolved against. It is built once at startup and read-only afterwards.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::util::fs::abs_path;

/// Global settings of the build workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    /// Workspace root (absolute)
    pub path: PathBuf,

    /// Build target, e.g. `RELEASE`, `DEBUG`, `NOOPT`
    pub target: String,

    /// Target architecture(s), e.g. `X64`, `IA32 X64`
    pub target_arch: String,

    /// Tool-chain tag, e.g. `GCC5`, `XCODE5`, `VS2012x86`
    pub tool_chain_tag: String,

    /// Directory receiving `build_rule.txt`, `tools_def.txt` and `target.txt`
    pub conf_path: PathBuf,
}

impl Workspace {
    /// Resolve a configuration path against the workspace root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        abs_path(path, &self.path)
    }
}
