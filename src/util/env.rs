//! Environment handed to the external toolchain.
//!
//! Instead of mutating the process environment, pug composes an explicit
//! [`Environment`] and passes it to every child process it spawns.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::{CodeTree, Workspace};
use crate::util::context::Host;
use crate::util::shell::Shell;

/// How a composed key is assigned, selected by its one-character sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assign {
    /// `+KEY`: `old SEP new`
    Append,
    /// `*KEY`: `new SEP old`
    Prepend,
    /// `=KEY`: only when absent
    IfAbsent,
    /// `KEY`: always
    Set,
}

impl Assign {
    /// Split a composer key into its assignment kind and variable name.
    pub fn parse(key: &str) -> (Assign, &str) {
        if let Some(name) = key.strip_prefix('+') {
            (Assign::Append, name)
        } else if let Some(name) = key.strip_prefix('*') {
            (Assign::Prepend, name)
        } else if let Some(name) = key.strip_prefix('=') {
            (Assign::IfAbsent, name)
        } else {
            (Assign::Set, key)
        }
    }
}

/// Variables passed to external processes.
///
/// On Windows hosts names compare case-insensitively, and an assignment to an
/// existing variable keeps the spelling it already has (`Path` stays `Path`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    separator: char,
    ignore_case: bool,
}

impl Environment {
    /// An empty environment using the host's path-list separator and
    /// variable-name rules.
    pub fn new(host: Host) -> Self {
        Environment {
            vars: BTreeMap::new(),
            separator: host.path_separator(),
            ignore_case: host.is_windows(),
        }
    }

    /// The stored spelling of `key`, if the variable is set.
    fn stored_key(&self, key: &str) -> Option<&str> {
        if self.ignore_case {
            self.vars
                .keys()
                .find(|k| k.eq_ignore_ascii_case(key))
                .map(String::as_str)
        } else {
            self.vars.get_key_value(key).map(|(k, _)| k.as_str())
        }
    }

    fn insert(&mut self, key: &str, value: String) {
        let key = self.stored_key(key).unwrap_or(key).to_string();
        self.vars.insert(key, value);
    }

    /// Snapshot of the current process environment.
    pub fn from_process(host: Host) -> Self {
        let mut env = Environment::new(host);
        for (k, v) in std::env::vars_os() {
            env.insert(&k.to_string_lossy(), v.to_string_lossy().into_owned());
        }
        env
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = self.stored_key(key)?;
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.stored_key(key).is_some()
    }

    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.insert(key.as_ref(), value.into());
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expand a `$NAME` macro against the current values; other values are
    /// returned unchanged. Unset variables expand to an empty string.
    pub fn expand(&self, value: &str) -> String {
        match value.strip_prefix('$') {
            Some(name) => self.get(name).unwrap_or_default().to_string(),
            None => value.to_string(),
        }
    }

    /// Apply one sigil-prefixed assignment, e.g. `compose("+PATH", "/x")`.
    pub fn compose(&mut self, key: &str, value: &str) {
        let (assign, name) = Assign::parse(key);
        if name.is_empty() {
            tracing::warn!("ignoring environment assignment without a name: `{}`", key);
            return;
        }
        let value = self.expand(value);
        let sep = self.separator;

        let new = match (assign, self.get(name)) {
            (Assign::Append, Some(old)) => format!("{}{}{}", old, sep, value),
            (Assign::Prepend, Some(old)) => format!("{}{}{}", value, sep, old),
            (Assign::IfAbsent, Some(_)) => return,
            _ => value,
        };
        tracing::debug!("env {} = {}", name, new);
        self.insert(name, new);
    }

    /// Like [`compose`](Self::compose), for a path value.
    pub fn compose_path(&mut self, key: &str, value: &Path) {
        self.compose(key, &value.to_string_lossy());
    }

    /// A variable as a path; empty when unset.
    pub fn path(&self, key: &str) -> PathBuf {
        PathBuf::from(self.get(key).unwrap_or_default())
    }
}

/// Variables reported once the SDK environment is composed.
const REPORTED: &[&str] = &["WORKSPACE", "PACKAGES_PATH", "EDK_TOOLS_PATH", "CONF_PATH"];

/// Compose the variables the SDK's build tools expect.
///
/// The order is significant: later values expand earlier ones, and
/// set-if-absent assignments keep values the user already exported.
pub fn compose_sdk_env(
    env: &mut Environment,
    workspace: &Workspace,
    codetree: &CodeTree,
    host: Host,
    invocation_dir: &Path,
    shell: &Shell,
) {
    env.compose_path("=WORKSPACE", &workspace.path);
    if let Some(primary) = codetree.primary() {
        env.compose_path("=UDK_ABSOLUTE_DIR", &primary.path);
    }
    let udk_dir = env.path("UDK_ABSOLUTE_DIR");
    env.compose_path("=EDK_TOOLS_PATH", &udk_dir.join("BaseTools"));
    let workspace_dir = env.path("WORKSPACE");
    env.compose_path("=CONF_PATH", &workspace_dir.join("Conf"));
    env.compose("=BASE_TOOLS_PATH", "$EDK_TOOLS_PATH");
    let tools = env.path("EDK_TOOLS_PATH");
    env.compose_path("=PYTHONPATH", &tools.join("Source").join("Python"));
    env.compose_path(
        "=EDK_TOOLS_PATH_BIN",
        &tools.join("BinWrappers").join(host.bin_wrappers()),
    );

    if host.is_windows() {
        env.compose_path("*PATH", &tools.join("Bin").join("Win32"));
        if let Some(python_home) = locate_python_home() {
            env.compose_path("=PYTHON_HOME", &python_home);
            env.compose_path("=PYTHONHOME", &python_home);
        }
        if let Some(nasm) = locate_nasm() {
            let mut prefix = nasm.to_string_lossy().into_owned();
            prefix.push(std::path::MAIN_SEPARATOR);
            env.compose("=NASM_PREFIX", &prefix);
        }
        env.compose("=PYTHON_COMMAND", "python");
    }

    env.compose("*PATH", "$EDK_TOOLS_PATH_BIN");
    env.compose("+PACKAGES_PATH", "$UDK_ABSOLUTE_DIR");
    env.compose_path("+PACKAGES_PATH", invocation_dir);
    for (name, entry) in codetree.secondaries() {
        if entry.multiworkspace {
            tracing::debug!("adding `{}` to PACKAGES_PATH", name);
            env.compose_path("+PACKAGES_PATH", &entry.path);
        }
    }

    for key in REPORTED {
        shell.say(format!("{:<14} = {}", key, env.get(key).unwrap_or_default()));
    }
}

/// Directory holding `nasm`, searched on `PATH` first, then in the usual
/// Windows install locations.
pub fn locate_nasm() -> Option<PathBuf> {
    if let Ok(path) = which::which("nasm") {
        return path.parent().map(Path::to_path_buf);
    }
    let mut candidates = vec![
        PathBuf::from(r"C:\Program Files\NASM\nasm.exe"),
        PathBuf::from(r"C:\Program Files (x86)\NASM\nasm.exe"),
        PathBuf::from(r"C:\NASM\nasm.exe"),
    ];
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        candidates.push(Path::new(&local).join("bin").join("NASM").join("nasm.exe"));
    }
    candidates
        .into_iter()
        .find(|p| p.exists())
        .and_then(|p| p.parent().map(Path::to_path_buf))
}

/// Installation directory of the Python interpreter the SDK scripts use.
pub fn locate_python_home() -> Option<PathBuf> {
    which::which("python")
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
}
