//! Subprocess execution utilities.
//!
//! External commands are shell command lines, run from a working directory
//! with an explicit [`Environment`]. In captured mode stdout and stderr are
//! drained by two reader threads which are joined before the result is
//! returned, so callers never observe a partial buffer.

use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::thread;

use anyhow::{Context, Result};

use crate::util::context::Host;
use crate::util::env::Environment;
use crate::util::shell::Shell;

/// A shell command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine(String);

impl CommandLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandLine {
    fn from(s: &str) -> Self {
        CommandLine(s.to_string())
    }
}

impl From<String> for CommandLine {
    fn from(s: String) -> Self {
        CommandLine(s)
    }
}

/// Parts are joined with single spaces.
impl<S: AsRef<str>> From<&[S]> for CommandLine {
    fn from(parts: &[S]) -> Self {
        CommandLine(
            parts
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

impl From<Vec<String>> for CommandLine {
    fn from(parts: Vec<String>) -> Self {
        CommandLine::from(parts.as_slice())
    }
}

/// Outcome of one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Exit code; 0 is success, -1 when killed by a signal
    pub exit_code: i32,

    /// Captured stdout lines (empty in streaming mode)
    pub stdout: Vec<String>,

    /// Captured stderr lines (empty in streaming mode)
    pub stderr: Vec<String>,
}

impl RunResult {
    pub fn success() -> Self {
        RunResult::default()
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// Fold another result into this one.
    ///
    /// Exit codes are OR-ed together, so any failure marks the whole as
    /// failed, even though which entry failed is lost. Output is
    /// concatenated in call order.
    pub fn merge(&mut self, other: RunResult) {
        self.exit_code |= other.exit_code;
        self.stdout.extend(other.stdout);
        self.stderr.extend(other.stderr);
    }

    /// Print the outcome of a stage.
    ///
    /// Failures print the captured stdout and stderr; success prints a bare
    /// marker. Returns the exit code.
    pub fn report(&self, prompt: &str, shell: &Shell) -> i32 {
        if self.is_success() {
            shell.success(format!("{}Success", prompt));
        } else {
            let out = self.stdout.join("\n");
            let err = self.stderr.join("\n");
            if out.is_empty() && err.is_empty() {
                shell.error(format!("{}exit code {}", prompt, self.exit_code));
            } else {
                shell.error(format!("{}{}\nSTDERR:\n{}", prompt, out, err));
            }
        }
        self.exit_code
    }
}

/// Runs external commands.
pub trait ProcessRunner {
    /// Run `command` in `working_dir` with `env`.
    ///
    /// With `verbose` the child inherits the standard streams and the
    /// returned buffers are empty.
    fn run(
        &self,
        command: &CommandLine,
        working_dir: &Path,
        env: &Environment,
        verbose: bool,
    ) -> Result<RunResult>;
}

/// Runs commands through the host shell.
#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    host: Host,
}

impl SystemRunner {
    pub fn new(host: Host) -> Self {
        SystemRunner { host }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        command: &CommandLine,
        working_dir: &Path,
        env: &Environment,
        verbose: bool,
    ) -> Result<RunResult> {
        let dir = ScopedDir::enter(working_dir)?;
        tracing::info!("Run: [{}] @ [{}]", command, dir.current().display());

        let builder = ProcessBuilder::shell(self.host, command)
            .cwd(dir.current())
            .env(env);
        if verbose {
            builder.exec_streaming()
        } else {
            builder.exec_captured()
        }
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: Option<Vec<(String, String)>>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: None,
            cwd: None,
        }
    }

    /// Run a command line through the host's shell.
    pub fn shell(host: Host, command: &CommandLine) -> Self {
        if host.is_windows() {
            ProcessBuilder::new("cmd").args(["/C", command.as_str()])
        } else {
            ProcessBuilder::new("sh").args(["-c", command.as_str()])
        }
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Replace the child's environment with `env`.
    pub fn env(mut self, env: &Environment) -> Self {
        self.env = Some(
            env.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref env) = self.env {
            cmd.env_clear();
            cmd.envs(env.iter().map(|(k, v)| (k, v)));
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute with the caller's standard streams; nothing is captured.
    pub fn exec_streaming(&self) -> Result<RunResult> {
        let status = self
            .build_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to execute `{}`", self.display_command()))?;

        Ok(RunResult {
            exit_code: status.code().unwrap_or(-1),
            ..RunResult::default()
        })
    }

    /// Execute, draining stdout and stderr on dedicated threads.
    pub fn exec_captured(&self) -> Result<RunResult> {
        let mut child = self
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.display_command()))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr) = thread::scope(|s| -> Result<_> {
            let out = thread::Builder::new()
                .name("stdout-redirector".to_string())
                .spawn_scoped(s, move || stdout.map(drain_lines).unwrap_or_default())
                .context("failed to start stdout reader")?;
            let err = thread::Builder::new()
                .name("stderr-redirector".to_string())
                .spawn_scoped(s, move || stderr.map(drain_lines).unwrap_or_default())
                .context("failed to start stderr reader")?;
            Ok((
                out.join().unwrap_or_default(),
                err.join().unwrap_or_default(),
            ))
        })?;

        let status = child
            .wait()
            .with_context(|| format!("failed to wait for `{}`", self.display_command()))?;

        Ok(RunResult {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

/// Read a stream to its end, one decoded line per element.
fn drain_lines<R: Read>(stream: R) -> Vec<String> {
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => lines.push(String::from_utf8_lossy(&buf).trim_end().to_string()),
            Err(e) => {
                tracing::warn!("error reading child output: {}", e);
                break;
            }
        }
    }
    lines
}

/// Serializes changes of the process working directory.
static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Scoped change of the process working directory.
///
/// The previous directory is restored when the guard drops, on every exit
/// path. Guards are not reentrant: entering a second guard on the same
/// thread while one is alive deadlocks.
pub struct ScopedDir {
    previous: PathBuf,
    current: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedDir {
    /// Enter `dir`; a relative `dir` is taken from the current directory.
    pub fn enter(dir: &Path) -> Result<Self> {
        let lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let previous = std::env::current_dir().context("failed to get current directory")?;
        let current = previous.join(dir);
        std::env::set_current_dir(&current)
            .with_context(|| format!("failed to enter directory: {}", current.display()))?;
        Ok(ScopedDir {
            previous,
            current,
            _lock: lock,
        })
    }

    /// Directory entered (absolute).
    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Directory restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for ScopedDir {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(
                "failed to return to {}: {}",
                self.previous.display(),
                e
            );
        }
    }
}
