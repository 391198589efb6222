//! Error types for conjure-ir.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while resolving IR or generating output files.
#[derive(Debug, Error)]
pub enum IrError {
    /// Filesystem error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external program (compiler or generator) could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external program ran but exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    /// Remote IR could not be downloaded.
    #[error("failed to fetch IR from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The resolved bytes are not a JSON object.
    #[error("invalid IR from {origin}: {reason}")]
    InvalidIr { origin: String, reason: String },
}

/// Convenience constructor for [`IrError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> IrError {
    IrError::Io {
        path: path.into(),
        source,
    }
}
