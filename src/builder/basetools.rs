//! SDK configuration files and the BaseTools native helpers.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::context::Host;
use crate::util::env::Environment;
use crate::util::fs::ensure_dir;
use crate::util::process::{CommandLine, ProcessRunner};
use crate::util::shell::Shell;

/// Configuration templates shipped in `BaseTools/Conf`.
pub const CONF_TEMPLATES: &[&str] = &["build_rule", "tools_def", "target"];

/// Pass-through argument that also cleans the native helpers.
pub const CLEAN_ALL: &str = "cleanall";

/// `BaseTools/Conf` of the composed environment.
fn template_dir(env: &Environment) -> PathBuf {
    let tools = match env.get("EDK_TOOLS_PATH") {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => env.path("WORKSPACE").join("BaseTools"),
    };
    tools.join("Conf")
}

/// Copy the configuration templates into `conf_dir` as `<name>.txt`.
///
/// `CONF_PATH` is pointed at `conf_dir` whatever it was before.
pub fn copy_conf_files(env: &mut Environment, conf_dir: &Path, shell: &Shell) -> Result<()> {
    ensure_dir(conf_dir)?;
    env.set("CONF_PATH", conf_dir.to_string_lossy());

    let src_dir = template_dir(env);
    for name in CONF_TEMPLATES {
        let src = src_dir.join(format!("{}.template", name));
        let dest = conf_dir.join(format!("{}.txt", name));
        if shell.is_verbose() {
            shell.say(format!("Copy {}\nTo   {}", src.display(), dest.display()));
        }
        std::fs::copy(&src, &dest)
            .with_context(|| format!("failed to copy {} to {}", src.display(), dest.display()))?;
    }
    Ok(())
}

/// Command line building the native helpers.
pub fn basetools_command<S: AsRef<str>>(host: Host, jobs: usize, build_args: &[S]) -> CommandLine {
    let mut cmd = vec![host.make_tool().to_string()];
    if !host.is_windows() {
        cmd.push("--jobs".to_string());
        cmd.push(jobs.to_string());
    }
    if build_args.iter().any(|a| a.as_ref() == CLEAN_ALL) {
        cmd.push("clean".to_string());
    }
    CommandLine::from(cmd)
}

/// Build the native helpers in `$EDK_TOOLS_PATH`. Returns the exit code.
pub fn build_basetools<S: AsRef<str>>(
    runner: &dyn ProcessRunner,
    env: &Environment,
    host: Host,
    jobs: usize,
    build_args: &[S],
    shell: &Shell,
) -> Result<i32> {
    let cmd = basetools_command(host, jobs, build_args);
    let home = env.path("EDK_TOOLS_PATH");
    let result = runner.run(&cmd, &home, env, shell.is_verbose())?;
    Ok(result.report("build_basetools(): ", shell))
}
