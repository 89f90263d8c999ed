//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use pug::util::shell::ColorChoice;

/// Pug - the UDK guide dog
///
/// Prepares an EDK II workspace from Pug.toml and runs the SDK's build.
/// Arguments pug does not know are handed to `build` unchanged.
#[derive(Parser, Debug)]
#[command(name = "pug")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print the effective configuration, or one scope of it, and exit
    #[arg(long, value_name = "SCOPE")]
    pub dump_default_config: Option<Option<String>>,

    /// Project configuration file [default: ./Pug.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output level: 0 quiet, 1 stream the build, 2 stream everything
    #[arg(long, env = "PUG_VERBOSITY", default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbosity: u8,

    /// Colored output: auto, always, never
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Arguments passed to the SDK's build
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "BUILD_ARGS")]
    pub build_args: Vec<String>,
}
