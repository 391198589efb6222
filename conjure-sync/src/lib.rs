//! # conjure-sync
//!
//! Checksum-based reconciliation of generated output directories.
//!
//! Call [`reconcile::verify`] to see how a directory differs from freshly
//! generated files, [`reconcile::apply`] to make it match, or the
//! [`pipeline`] functions to do either for a list of projects.

pub mod checksum;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod writer;

pub use checksum::{Checksum, ChecksumDiff, ChecksumSet, DiffKind};
pub use error::SyncError;
pub use pipeline::{apply_all, verify_all, VerifyReport};
pub use reconcile::{apply, verify};
pub use writer::WriteResult;
