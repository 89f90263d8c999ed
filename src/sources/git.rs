//! Git working copies of code-tree entries.
//!
//! Git runs as a subprocess. Unless the user asked for quiet output its
//! streams are inherited, so clone progress and authentication prompts reach
//! the user directly.

use std::path::Path;

use anyhow::Result;

use crate::core::codetree::CodeTreeEntry;
use crate::util::env::Environment;
use crate::util::fs::ensure_dir;
use crate::util::process::{CommandLine, ProcessRunner, RunResult};

/// Quote a path for the shell when it contains whitespace.
fn shell_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    if s.chars().any(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.into_owned()
    }
}

/// Brings code-tree entries to their declared revision.
pub struct GitCheckout<'a> {
    runner: &'a dyn ProcessRunner,
    env: &'a Environment,
    verbose: bool,
}

impl<'a> GitCheckout<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, env: &'a Environment) -> Self {
        GitCheckout {
            runner,
            env,
            verbose: true,
        }
    }

    /// Stream git's output (the default) or capture it.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn git(&self, args: &str, dir: &Path) -> Result<RunResult> {
        let cmd = CommandLine::from(format!("git {}", args));
        self.runner.run(&cmd, dir, self.env, self.verbose)
    }

    /// Synchronize one entry.
    ///
    /// The local directory is created first. Entries without a URL are left
    /// as they are. A missing `.git` triggers a clone; the declared
    /// signature is always checked out, and submodules are updated for
    /// recursive entries. The first failing step ends the entry.
    pub fn sync(&self, name: &str, entry: &CodeTreeEntry) -> Result<RunResult> {
        let dir = &entry.path;
        ensure_dir(dir)?;

        let Some(url) = entry.url() else {
            tracing::debug!("code tree `{}` has no source, leaving {} as is", name, dir.display());
            return Ok(RunResult::success());
        };

        if !dir.join(".git").exists() {
            tracing::info!("cloning `{}` from {}", name, url);
            let r = self.git(&format!("clone {} {}", url, shell_path(dir)), dir)?;
            if !r.is_success() {
                return Ok(r);
            }
        }

        let r = self.git(&format!("checkout {}", entry.signature()), dir)?;
        if !r.is_success() || !entry.recursive {
            return Ok(r);
        }
        self.git("submodule update --init --recursive", dir)
    }
}
