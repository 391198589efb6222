//! Error types for conjure-asset.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or invoking assets.
///
/// Semantic outcomes an asset reports through its exit code (such as
/// "incompatible") are not errors; see [`crate::BackcompatOutcome`].
#[derive(Debug, Error)]
pub enum AssetError {
    /// The asset executable could not be started.
    #[error("failed to execute asset {asset}: {source}")]
    Spawn {
        asset: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The asset answered the type query with something unusable.
    #[error("asset {asset} returned an invalid type response: {reason}")]
    InvalidTypeResponse { asset: PathBuf, reason: String },

    #[error("asset {asset} reported unknown type '{kind}'")]
    UnknownType { asset: PathBuf, kind: String },

    #[error("only one backcompat asset may be configured, found {first} and {second}")]
    MultipleBackcompat { first: PathBuf, second: PathBuf },

    /// The asset exited with a status its protocol does not allow.
    #[error("asset {asset} failed {operation} with {status}:\n{output}")]
    ExitStatus {
        asset: PathBuf,
        operation: &'static str,
        status: String,
        output: String,
    },

    /// An extensions provider printed something other than a JSON object.
    #[error("asset {asset} returned invalid extensions: {reason}")]
    InvalidOutput { asset: PathBuf, reason: String },

    /// The IR (or its `extensions` field) has the wrong shape for merging.
    #[error("invalid IR: {0}")]
    InvalidIr(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`AssetError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> AssetError {
    AssetError::Io {
        path: path.into(),
        source,
    }
}
