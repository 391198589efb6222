//! Error types for conjure-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating plugin configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the path being read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the file path and serde_yaml line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("unsupported config version {version}; expected 1 or 2")]
    UnsupportedVersion { version: String },

    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: &'static str },

    #[error("project '{project}' has no ir-locator")]
    MissingIrLocator { project: String },

    #[error("project '{project}' has invalid ir-locator: {reason}")]
    InvalidIrLocator { project: String, reason: String },

    /// Two projects resolve to overlapping output directories.
    #[error(
        "output directories of projects '{first}' and '{second}' conflict: \
         {first_dir} and {second_dir} (set allow-conflicting-output-dirs to permit)"
    )]
    ConflictingOutputDirs {
        first: String,
        first_dir: PathBuf,
        second: String,
        second_dir: PathBuf,
    },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
