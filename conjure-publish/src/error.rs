//! Error types for conjure-publish.

use std::path::PathBuf;

use conjure_asset::AssetError;
use conjure_ir::IrError;
use thiserror::Error;

/// Errors raised while versioning, staging or uploading IR artifacts.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Ir(#[from] IrError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `git` could not be started.
    #[error("failed to run git in {dir}: {source}")]
    GitSpawn {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {args}` failed in {dir}: {stderr}")]
    GitFailed {
        dir: PathBuf,
        args: String,
        stderr: String,
    },

    #[error("could not derive a version from `git describe` output '{output}'")]
    InvalidVersion { output: String },

    #[error("project '{project}' is publishable but has no group-id")]
    MissingGroupId { project: String },

    #[error("upload to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
}

/// Convenience constructor for [`PublishError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PublishError {
    PublishError::Io {
        path: path.into(),
        source,
    }
}
