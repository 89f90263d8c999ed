//! Implementation of a pug run: prepare the SDK and drive its build.
//!
//! Stages run in a fixed order and stop at the first fatal failure:
//! sync code tree, apply patches, compose the environment, copy the
//! configuration templates and write `target.txt`, build BaseTools, write
//! the descriptors, run the SDK's `build`.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;

use crate::builder::{build_basetools, copy_conf_files, emit_components, emit_platform, emit_target_txt};
use crate::sources::{apply_patches, sync_codetree};
use crate::util::config::Config;
use crate::util::context::{GlobalContext, Host};
use crate::util::env::{compose_sdk_env, Environment};
use crate::util::process::{CommandLine, ProcessRunner};
use crate::util::shell::format_elapsed;

/// Options for a build run.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Arguments handed to the SDK's `build` as is
    pub build_args: Vec<String>,

    /// Number of parallel jobs (defaults to the available parallelism)
    pub jobs: Option<usize>,
}

/// Command line of the SDK's `build`.
///
/// On Windows the Visual Studio prefix script runs first in the same shell.
pub fn final_build_command<S: AsRef<str>>(host: Host, jobs: usize, tools_path: &Path, build_args: &[S]) -> CommandLine {
    let mut cmd = Vec::new();
    if host.is_windows() {
        cmd.push(tools_path.join("set_vsprefix_envs.bat").display().to_string());
        cmd.push(host.command_jointer().to_string());
    }
    cmd.push("build".to_string());
    cmd.push("-n".to_string());
    cmd.push(jobs.to_string());
    // no build cache
    cmd.push("-N".to_string());
    cmd.extend(build_args.iter().map(|a| a.as_ref().to_string()));
    CommandLine::from(cmd)
}

/// Run the whole pipeline and report the elapsed time.
///
/// `env` seeds the environment handed to every external process. Returns the
/// exit code of the failing stage, or of the SDK's `build`.
pub fn pug_build(
    ctx: &GlobalContext,
    config: &Config,
    opts: &BuildOptions,
    runner: &dyn ProcessRunner,
    env: Environment,
) -> Result<i32> {
    let start = Instant::now();
    let code = build(ctx, config, opts, runner, env)?;
    ctx.shell().say(format!(
        "\nPug's running elapsed time: {}",
        format_elapsed(start.elapsed())
    ));
    Ok(code)
}

/// Run the pipeline stages.
pub fn build(
    ctx: &GlobalContext,
    config: &Config,
    opts: &BuildOptions,
    runner: &dyn ProcessRunner,
    mut env: Environment,
) -> Result<i32> {
    let shell = ctx.shell();
    let host = ctx.host();
    let jobs = opts.jobs.unwrap_or_else(|| ctx.jobs());
    let workspace = &config.workspace;

    let span = shell.span("sync code tree");
    let code = sync_codetree(&config.codetree, runner, &env, !shell.is_quiet())?.report("setup_codetree(): ", shell);
    span.finish();
    if code != 0 {
        shell.error(format!("setup_codetree() returns: {}", code));
        shell.error("Unable to setup the UDK code tree correctly.");
        shell.error("Please check the access permission or the sanity of the external folder(s).");
        return Ok(code);
    }

    let span = shell.span("apply patches");
    let code = apply_patches(&config.codetree, &workspace.path, runner, &env)?.report("apply_patch(): ", shell);
    span.finish();
    if code != 0 {
        shell.warn(format!("apply_patch() returns: {}", code));
        shell.warn("The patch is not applied successfully.");
        shell.warn("Maybe the patch has been applied before. Ignoring the error.\n");
    }

    compose_sdk_env(&mut env, workspace, &config.codetree, host, ctx.cwd(), shell);

    let span = shell.span("configuration files");
    copy_conf_files(&mut env, &workspace.conf_path, shell)?;
    emit_target_txt(&config.target_txt)?;
    span.finish();

    let span = shell.span("build BaseTools");
    let code = build_basetools(runner, &env, host, jobs, &opts.build_args, shell)?;
    span.finish();
    if code != 0 {
        return Ok(code);
    }

    let span = shell.span("descriptors");
    if let Some(platform) = &config.platform {
        if !config.component.is_empty() {
            emit_platform(platform, &config.component, workspace, shell)?;
        }
    }
    if !config.component.is_empty() {
        emit_components(&config.component, workspace, shell)?;
    }
    span.finish();

    let span = shell.span("build");
    let cmd = final_build_command(host, jobs, &env.path("EDK_TOOLS_PATH"), &opts.build_args);
    let build_dir = env.path("WORKSPACE");
    let result = runner.run(&cmd, &build_dir, &env, !shell.is_quiet())?;
    span.finish();
    Ok(result.report("build(): ", shell))
}
