//! High-level operations.
//!
//! This module contains the implementation of the pug command line.

pub mod dump_config;
pub mod pug_build;

pub use dump_config::{dump_config, EMPTY_SCOPE};
pub use pug_build::{build, final_build_command, pug_build, BuildOptions};
