//! Shared utilities

pub mod config;
pub mod context;
pub mod env;
pub mod fs;
pub mod process;
pub mod shell;

pub use config::Config;
pub use context::GlobalContext;
pub use env::Environment;
pub use process::{ProcessRunner, RunResult, SystemRunner};
pub use shell::Shell;
