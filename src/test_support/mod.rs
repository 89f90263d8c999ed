//! Test utilities and mocks for Pug unit tests.
//!
//! [`MockRunner`] stands in for the system process runner, so the code-tree
//! synchronizer and the build pipeline can be tested without git, make or
//! the SDK.
//!
//! # Example
//!
//! ```rust,ignore
//! use pug::test_support::{exited, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.expect_prefix("git clone", exited(128));
//! // hand `&runner` to the code under test, then inspect `runner.calls()`
//! ```

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;

use crate::util::env::Environment;
use crate::util::process::{CommandLine, ProcessRunner, RunResult};

pub use fixtures::*;

/// A result with the given exit code and no output.
pub fn exited(code: i32) -> RunResult {
    RunResult {
        exit_code: code,
        ..RunResult::default()
    }
}

/// A result with captured output.
pub fn with_output(code: i32, stdout: &[&str], stderr: &[&str]) -> RunResult {
    RunResult {
        exit_code: code,
        stdout: stdout.iter().map(|s| s.to_string()).collect(),
        stderr: stderr.iter().map(|s| s.to_string()).collect(),
    }
}

/// Pattern for matching commands in MockRunner.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on the full command line.
    Exact(String),
    /// Match if the command line starts with prefix.
    StartsWith(String),
    /// Match if the command line contains substring.
    Contains(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s.as_str()),
            CommandPattern::Contains(s) => cmd.contains(s.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
struct Expectation {
    pattern: CommandPattern,
    result: RunResult,
}

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub command: String,
    pub working_dir: PathBuf,
    pub verbose: bool,
    pub env: Environment,
}

/// Mock process runner.
///
/// Commands matching an expectation return its result (first match wins);
/// every other command succeeds with no output.
#[derive(Debug, Default)]
pub struct MockRunner {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    fn push(&self, pattern: CommandPattern, result: RunResult) -> &Self {
        if let Ok(mut expectations) = self.expectations.lock() {
            expectations.push(Expectation { pattern, result });
        }
        self
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, result: RunResult) -> &Self {
        self.push(CommandPattern::Exact(cmd.to_string()), result)
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, result: RunResult) -> &Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), result)
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, result: RunResult) -> &Self {
        self.push(CommandPattern::Contains(substring.to_string()), result)
    }

    /// Every recorded invocation, in call order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// The command lines run, in call order.
    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }
}

impl ProcessRunner for MockRunner {
    fn run(
        &self,
        command: &CommandLine,
        working_dir: &Path,
        env: &Environment,
        verbose: bool,
    ) -> Result<RunResult> {
        let cmd = command.as_str();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                command: cmd.to_string(),
                working_dir: working_dir.to_path_buf(),
                verbose,
                env: env.clone(),
            });
        }

        let expectations = self
            .expectations
            .lock()
            .map_err(|_| anyhow::anyhow!("mock runner poisoned"))?;
        Ok(expectations
            .iter()
            .find(|e| e.pattern.matches(cmd))
            .map(|e| e.result.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::context::Host;

    #[test]
    fn test_mock_runner_matches_and_records() {
        let runner = MockRunner::new();
        runner
            .expect("make", exited(2))
            .expect_prefix("git clone", with_output(1, &["out"], &["err"]));
        let env = Environment::new(Host::Linux);

        let r = runner.run(&"make".into(), Path::new("/a"), &env, false).unwrap();
        assert_eq!(r.exit_code, 2);
        let r = runner.run(&"git clone x".into(), Path::new("/b"), &env, true).unwrap();
        assert_eq!(r.stderr, vec!["err".to_string()]);
        let r = runner.run(&"other".into(), Path::new("/c"), &env, false).unwrap();
        assert!(r.is_success());

        assert_eq!(runner.commands(), vec!["make", "git clone x", "other"]);
        assert!(runner.calls()[1].verbose);
    }
}
