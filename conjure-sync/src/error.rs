//! Error types for conjure-sync.

use std::path::PathBuf;

use thiserror::Error;

use conjure_ir::IrError;

/// All errors that can arise from reconciling an output directory.
#[derive(Debug, Error)]
pub enum SyncError {
    /// IR resolution, generation, or rendering failed.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generator produced two files with the same path.
    #[error("generator produced {path} more than once")]
    DuplicateOutput { path: PathBuf },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
