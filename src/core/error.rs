//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised for configuration that cannot be turned into a build.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A component descriptor is emitted without its `[Defines]` section.
    #[error("INF must contain [Defines] section: {}", path.display())]
    MissingDefines { path: PathBuf },

    #[error("failed to read config file `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
