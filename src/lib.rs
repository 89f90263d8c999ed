//! Pug - the UDK guide dog
//!
//! A front-end that prepares and drives an EDK II (UDK) firmware build from a
//! single `Pug.toml` and a set of plain source files. This crate provides the
//! library side: configuration, descriptor generation, code-tree
//! synchronization, environment composition, and the build pipeline.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for Pug unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::{
    codetree::{CodeTree, CodeTreeEntry},
    descriptor::{ComponentConfig, PlatformConfig, Section},
    error::ConfigError,
    target_config::TargetConfig,
    workspace::Workspace,
};

pub use util::config::Config;
pub use util::context::GlobalContext;
pub use util::process::RunResult;
