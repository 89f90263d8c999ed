//! Global context for Pug operations.
//!
//! Provides centralized access to the invocation directory, the host
//! platform, and output settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::util::shell::Shell;

/// Project configuration file looked up in the invocation directory.
pub const CONFIG_FILE: &str = "Pug.toml";

/// Host platform flavours that change how the SDK is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Linux,
    MacOs,
    Windows,
}

impl Host {
    /// The platform this binary runs on.
    pub fn current() -> Self {
        if cfg!(windows) {
            Host::Windows
        } else if cfg!(target_os = "macos") {
            Host::MacOs
        } else {
            Host::Linux
        }
    }

    pub fn is_windows(self) -> bool {
        self == Host::Windows
    }

    /// Separator of path lists such as `PATH` and `PACKAGES_PATH`.
    pub fn path_separator(self) -> char {
        if self.is_windows() {
            ';'
        } else {
            ':'
        }
    }

    /// Make tool used for the SDK's native helpers.
    pub fn make_tool(self) -> &'static str {
        if self.is_windows() {
            "nmake"
        } else {
            "make"
        }
    }

    /// Joins two shell commands into one command line.
    pub fn command_jointer(self) -> &'static str {
        if self.is_windows() {
            "&"
        } else {
            ";"
        }
    }

    /// Directory name of the SDK's tool wrappers under `BinWrappers`.
    pub fn bin_wrappers(self) -> &'static str {
        if self.is_windows() {
            "WindowsLike"
        } else {
            "PosixLike"
        }
    }
}

/// Global context containing paths and output settings.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Directory pug was invoked from
    cwd: PathBuf,

    host: Host,

    /// Verbosity level: 0 quiet, 1 normal, 2 verbose
    verbosity: u8,

    shell: Arc<Shell>,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current process.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext::with_cwd(cwd))
    }

    /// Create a context rooted at an explicit directory.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        GlobalContext {
            cwd: cwd.into(),
            host: Host::current(),
            verbosity: 1,
            shell: Arc::new(Shell::default()),
        }
    }

    pub fn with_host(mut self, host: Host) -> Self {
        self.host = host;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = Arc::new(shell);
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn host(&self) -> Host {
        self.host
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn shell(&self) -> &Arc<Shell> {
        &self.shell
    }

    /// Default location of the project configuration.
    pub fn config_path(&self) -> PathBuf {
        self.cwd.join(CONFIG_FILE)
    }

    /// Number of parallel jobs handed to the external tools.
    pub fn jobs(&self) -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
