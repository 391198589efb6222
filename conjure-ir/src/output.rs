//! [`OutputFile`]: one file the generator wants to exist on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::IrError;

type RenderFn = dyn Fn() -> Result<Vec<u8>, IrError> + Send + Sync;

/// An absolute path plus a render function producing the file's bytes.
///
/// Rendering must be pure: verify and apply may both render the same file.
#[derive(Clone)]
pub struct OutputFile {
    path: PathBuf,
    render: Arc<RenderFn>,
}

impl OutputFile {
    pub fn new<F>(path: impl Into<PathBuf>, render: F) -> Self
    where
        F: Fn() -> Result<Vec<u8>, IrError> + Send + Sync + 'static,
    {
        Self {
            path: path.into(),
            render: Arc::new(render),
        }
    }

    /// An output file whose content is already known.
    pub fn from_bytes(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        let content: Arc<[u8]> = Arc::from(content.into());
        Self::new(path, move || Ok(content.to_vec()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self) -> Result<Vec<u8>, IrError> {
        (self.render)()
    }
}

impl fmt::Debug for OutputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
