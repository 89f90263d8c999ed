//! Core data model: workspace, code tree, descriptors, target configuration.

pub mod codetree;
pub mod descriptor;
pub mod error;
pub mod target_config;
pub mod workspace;

pub use codetree::{CodeTree, CodeTreeEntry, SourceSpec, PRIMARY_TREE};
pub use descriptor::{ComponentConfig, Entry, PlatformConfig, Scalar, Section};
pub use error::ConfigError;
pub use target_config::TargetConfig;
pub use workspace::Workspace;
