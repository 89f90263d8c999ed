//! Code-tree synchronization.
//!
//! The primary SDK tree is synchronized first, then every other entry in
//! name order. Results are folded with [`RunResult::merge`], so the combined
//! exit code is non-zero when any entry failed.

pub mod git;

use std::path::Path;

use anyhow::Result;

use crate::core::codetree::{CodeTree, PRIMARY_TREE};
use crate::util::env::Environment;
use crate::util::process::{CommandLine, ProcessRunner, RunResult};

pub use git::GitCheckout;

/// Synchronize every code-tree entry.
///
/// When the primary entry fails, the other entries are left alone. Git's
/// output is streamed when `verbose` is set and captured otherwise.
pub fn sync_codetree(
    codetree: &CodeTree,
    runner: &dyn ProcessRunner,
    env: &Environment,
    verbose: bool,
) -> Result<RunResult> {
    let checkout = GitCheckout::new(runner, env).verbose(verbose);
    let mut result = RunResult::success();

    if let Some(primary) = codetree.primary() {
        result = checkout.sync(PRIMARY_TREE, primary)?;
        if !result.is_success() {
            tracing::warn!("primary code tree failed, skipping the others");
            return Ok(result);
        }
    }

    for (name, entry) in codetree.secondaries() {
        result.merge(checkout.sync(name, entry)?);
    }
    Ok(result)
}

/// Run the patch command of every entry that declares one, from the
/// workspace root, with output captured.
pub fn apply_patches(
    codetree: &CodeTree,
    workspace_dir: &Path,
    runner: &dyn ProcessRunner,
    env: &Environment,
) -> Result<RunResult> {
    let mut result = RunResult::success();
    for (name, entry) in codetree.iter() {
        let Some(patch) = &entry.patch else {
            continue;
        };
        tracing::debug!("patching `{}`", name);
        result.merge(runner.run(&CommandLine::from(patch.as_str()), workspace_dir, env, false)?);
    }
    Ok(result)
}
