//! Configuration file support for Pug.
//!
//! The effective configuration is built in two layers:
//! - Defaults: derived from the process environment (`UDK_DIR`, `EDK2_TAG`,
//!   `BUILD_TARGET`, ...) and the host platform.
//! - Project: `Pug.toml` in the invocation directory. Every table in it is
//!   optional and merged field by field into the defaults.
//!
//! ```toml
//! [defaults]
//! edk2_tag = "edk2-stable202205"
//!
//! [workspace]
//! target = "DEBUG"
//!
//! [codetree.edk2-libc]
//! path = "edk2-libc"
//! multiworkspace = true
//! source = { url = "https://github.com/tianocore/edk2-libc.git" }
//!
//! [target_txt]
//! MAX_CONCURRENT_THREAD_NUMBER = 8
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::codetree::{CodeTree, CodeTreeEntry, SourceSpec, PRIMARY_TREE};
use crate::core::descriptor::{ComponentConfig, PlatformConfig, Scalar};
use crate::core::error::ConfigError;
use crate::core::target_config::{TargetConfig, ACTIVE_PLATFORM};
use crate::core::workspace::Workspace;
use crate::util::context::Host;
use crate::util::fs::abs_path;

pub const DEFAULT_GCC_TAG: &str = "GCC5";
pub const DEFAULT_XCODE_TAG: &str = "XCODE5";
pub const DEFAULT_MSVC_TAG: &str = "VS2012x86";
pub const DEFAULT_EDK2_TAG: &str = "edk2-stable201905";
pub const DEFAULT_EDK2_REPO: &str = "https://github.com/tianocore/edk2.git";
pub const DEFAULT_TARGET_ARCH: &str = "X64";
pub const DEFAULT_BUILD_TARGET: &str = "RELEASE";

/// Default values every configuration starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub gcc_tag: String,
    pub xcode_tag: String,
    pub msvc_tag: String,
    /// Local path of the primary SDK tree
    pub udk_dir: PathBuf,
    pub edk2_tag: String,
    pub edk2_repo: String,
    pub target_arch: String,
    pub build_target: String,
    pub workspace_dir: PathBuf,
    /// Check the SDK out into `udk_dir/<edk2_tag>`
    pub path_append_signature: bool,
    /// `CONF_PATH` from the environment, if exported
    pub conf_path: Option<PathBuf>,
}

impl Defaults {
    /// Defaults for the running process.
    pub fn from_env(cwd: &Path) -> Self {
        Defaults::from_lookup(cwd, |k| std::env::var(k).ok())
    }

    /// Defaults using `lookup` to read environment variables.
    pub fn from_lookup(cwd: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |k: &str, default: &str| lookup(k).unwrap_or_else(|| default.to_string());
        let udk_dir = lookup("UDK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_udk_dir);

        Defaults {
            gcc_tag: DEFAULT_GCC_TAG.to_string(),
            xcode_tag: DEFAULT_XCODE_TAG.to_string(),
            msvc_tag: var("MSVC_TAG", DEFAULT_MSVC_TAG),
            udk_dir,
            edk2_tag: var("EDK2_TAG", DEFAULT_EDK2_TAG),
            edk2_repo: var("EDK2_REPO", DEFAULT_EDK2_REPO),
            target_arch: var("TARGET_ARCH", DEFAULT_TARGET_ARCH),
            build_target: var("BUILD_TARGET", DEFAULT_BUILD_TARGET),
            workspace_dir: lookup("WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or_else(|| cwd.to_path_buf()),
            path_append_signature: false,
            conf_path: lookup("CONF_PATH").map(PathBuf::from),
        }
    }

    /// Merge the `[defaults]` table of a project file (project wins).
    pub fn merge(&mut self, other: DefaultsOverride) {
        if let Some(v) = other.gcc_tag {
            self.gcc_tag = v;
        }
        if let Some(v) = other.xcode_tag {
            self.xcode_tag = v;
        }
        if let Some(v) = other.msvc_tag {
            self.msvc_tag = v;
        }
        if let Some(v) = other.udk_dir {
            self.udk_dir = v;
        }
        if let Some(v) = other.edk2_tag {
            self.edk2_tag = v;
        }
        if let Some(v) = other.edk2_repo {
            self.edk2_repo = v;
        }
        if let Some(v) = other.target_arch {
            self.target_arch = v;
        }
        if let Some(v) = other.build_target {
            self.build_target = v;
        }
        if let Some(v) = other.workspace_dir {
            self.workspace_dir = v;
        }
        if let Some(v) = other.path_append_signature {
            self.path_append_signature = v;
        }
    }

    /// Tool-chain tag for the host.
    pub fn tool_chain_tag(&self, host: Host) -> &str {
        match host {
            Host::Windows => &self.msvc_tag,
            Host::MacOs => &self.xcode_tag,
            Host::Linux => &self.gcc_tag,
        }
    }
}

/// `~/.cache/pug/edk2`
fn default_udk_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().join(".cache").join("pug").join("edk2"))
        .unwrap_or_else(|| PathBuf::from(".cache").join("pug").join("edk2"))
}

/// `[defaults]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsOverride {
    pub gcc_tag: Option<String>,
    pub xcode_tag: Option<String>,
    pub msvc_tag: Option<String>,
    pub udk_dir: Option<PathBuf>,
    pub edk2_tag: Option<String>,
    pub edk2_repo: Option<String>,
    pub target_arch: Option<String>,
    pub build_target: Option<String>,
    pub workspace_dir: Option<PathBuf>,
    pub path_append_signature: Option<bool>,
}

/// `[workspace]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceOverride {
    pub path: Option<PathBuf>,
    pub target: Option<String>,
    pub target_arch: Option<String>,
    pub tool_chain_tag: Option<String>,
    pub conf_path: Option<PathBuf>,
}

/// `[codetree.<name>]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodeTreeOverride {
    pub source: Option<SourceSpec>,
    pub path: Option<PathBuf>,
    pub recursive: Option<bool>,
    pub multiworkspace: Option<bool>,
    pub patch: Option<String>,
}

/// `[target_txt]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetTxtOverride {
    pub path: Option<PathBuf>,
    pub update: Option<bool>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, Scalar>,
}

/// Contents of `Pug.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectFile {
    pub defaults: DefaultsOverride,
    pub workspace: WorkspaceOverride,
    pub codetree: BTreeMap<String, CodeTreeOverride>,
    pub platform: Option<PlatformConfig>,
    pub component: Vec<ComponentConfig>,
    pub target_txt: TargetTxtOverride,
}

impl ProjectFile {
    /// Load a project file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ProjectFile::parse(&contents, path)
    }

    /// Parse project file contents; `path` is used for error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The effective configuration of a build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub workspace: Workspace,
    pub codetree: CodeTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub component: Vec<ComponentConfig>,
    pub target_txt: TargetConfig,
}

impl Config {
    /// The configuration produced by defaults alone.
    pub fn from_defaults(defaults: Defaults, cwd: &Path, host: Host) -> Self {
        Config::resolve(defaults, ProjectFile::default(), cwd, host)
    }

    /// Merge a project file into defaults.
    ///
    /// Paths given relative in the project file are resolved against the
    /// workspace root; the workspace root itself against `cwd`.
    pub fn resolve(mut defaults: Defaults, project: ProjectFile, cwd: &Path, host: Host) -> Self {
        defaults.merge(project.defaults);

        let ws = project.workspace;
        let path = abs_path(
            ws.path.as_deref().unwrap_or(defaults.workspace_dir.as_path()),
            cwd,
        );
        let conf_path = ws
            .conf_path
            .or_else(|| defaults.conf_path.clone())
            .map(|p| abs_path(&p, &path))
            .unwrap_or_else(|| path.join("Build").join("Conf"));
        let workspace = Workspace {
            target: ws.target.unwrap_or_else(|| defaults.build_target.clone()),
            target_arch: ws.target_arch.unwrap_or_else(|| defaults.target_arch.clone()),
            tool_chain_tag: ws
                .tool_chain_tag
                .unwrap_or_else(|| defaults.tool_chain_tag(host).to_string()),
            path,
            conf_path,
        };

        let codetree = resolve_codetree(&defaults, project.codetree, &workspace);
        let target_txt = resolve_target_txt(project.target_txt, &workspace, project.platform.as_ref());

        Config {
            workspace,
            codetree,
            platform: project.platform,
            component: project.component,
            target_txt,
        }
    }
}

fn resolve_codetree(
    defaults: &Defaults,
    overrides: BTreeMap<String, CodeTreeOverride>,
    workspace: &Workspace,
) -> CodeTree {
    let mut udk_dir = abs_path(&defaults.udk_dir, &workspace.path);
    if defaults.path_append_signature && !defaults.edk2_tag.is_empty() {
        udk_dir = udk_dir.join(&defaults.edk2_tag);
    }
    let mut primary = CodeTreeEntry::new(udk_dir).with_source(&defaults.edk2_repo, &defaults.edk2_tag);
    primary.recursive = true;
    primary.multiworkspace = true;

    let mut tree = CodeTree::new();
    tree.insert(PRIMARY_TREE, primary);

    for (name, ov) in overrides {
        if tree.get(&name).is_none() {
            tree.insert(name.clone(), CodeTreeEntry::new(workspace.path.join(&name)));
        }
        let Some(entry) = tree.get_mut(&name) else {
            continue;
        };
        if let Some(source) = ov.source {
            let merged = entry.source.get_or_insert_with(SourceSpec::default);
            if source.url.is_some() {
                merged.url = source.url;
            }
            if source.signature.is_some() {
                merged.signature = source.signature;
            }
        }
        if let Some(path) = ov.path {
            entry.path = abs_path(&path, &workspace.path);
        }
        if let Some(v) = ov.recursive {
            entry.recursive = v;
        }
        if let Some(v) = ov.multiworkspace {
            entry.multiworkspace = v;
        }
        if ov.patch.is_some() {
            entry.patch = ov.patch;
        }
    }
    tree
}

fn resolve_target_txt(
    ov: TargetTxtOverride,
    workspace: &Workspace,
    platform: Option<&PlatformConfig>,
) -> TargetConfig {
    let mut entries = BTreeMap::new();
    entries.insert("TOOL_CHAIN_CONF".to_string(), "tools_def.txt".to_string());
    entries.insert("BUILD_RULE_CONF".to_string(), "build_rule.txt".to_string());
    entries.insert("TARGET".to_string(), workspace.target.clone());
    entries.insert("TARGET_ARCH".to_string(), workspace.target_arch.clone());
    entries.insert("TOOL_CHAIN_TAG".to_string(), workspace.tool_chain_tag.clone());
    entries.insert(
        ACTIVE_PLATFORM.to_string(),
        platform
            .map(|p| p.path.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    entries.extend(ov.entries.into_iter().map(|(k, v)| (k, v.to_string())));

    TargetConfig {
        path: ov
            .path
            .map(|p| abs_path(&p, &workspace.path))
            .unwrap_or_else(|| workspace.conf_path.join("target.txt")),
        update: ov.update.unwrap_or(true),
        entries,
    }
}

/// Load the effective configuration.
///
/// A missing project file is not an error: the defaults are used as is.
pub fn load_config(project_path: &Path, cwd: &Path, host: Host) -> Result<Config> {
    let defaults = Defaults::from_env(cwd);
    let project = if project_path.exists() {
        ProjectFile::load(project_path)?
    } else {
        tracing::info!(
            "no project file at {}, using defaults",
            project_path.display()
        );
        ProjectFile::default()
    };
    Ok(Config::resolve(defaults, project, cwd, host))
}
