//! Atomic file writes and stale-file removal.
//!
//! ## `atomic_write` protocol
//!
//! 1. Create the parent directory.
//! 2. Write to `<path>.conjure.tmp`.
//! 3. Rename to the final path (atomic on POSIX).
//! 4. On rename failure remove the `.tmp` and leave the original intact.
//!
//! A `.conjure.tmp` file left behind by a crash carries the ownership marker,
//! so the next apply run removes it as stale output.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Outcome of reconciling an individual path in apply mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; on-disk content already matches.
    Unchanged { path: PathBuf },
    /// Stale owned file was removed.
    Deleted { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::Deleted { path } => path,
        }
    }
}

/// Temp-file sibling used by [`atomic_write`].
pub fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.conjure.tmp", path.display()))
}

/// Atomically replace `path` with `content`.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> Result<(), SyncError> {
    atomic_write_with_tmp(path, content, &tmp_path(path))
}

fn atomic_write_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(())
}

/// Remove a stale generated file. Already-absent files are not an error.
pub(crate) fn remove_stale(path: &Path) -> Result<(), SyncError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("deleted: {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn write_creates_file_and_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pkg").join("sub").join("types.conjure.go");
        atomic_write(&path, b"package sub\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"package sub\n");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.conjure.go");
        atomic_write(&path, b"data").unwrap();
        assert!(!tmp_path(&path).exists(), ".conjure.tmp must be cleaned up");
    }

    #[test]
    fn overwrite_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.conjure.go");
        atomic_write(&path, b"v1").unwrap();
        atomic_write(&path, b"v2").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"v2");
    }

    #[test]
    fn remove_stale_tolerates_absent_file() {
        let tmp = TempDir::new().unwrap();
        remove_stale(&tmp.path().join("gone.conjure.go")).unwrap();
    }

    #[test]
    fn write_result_path_accessor() {
        let r = WriteResult::Deleted {
            path: PathBuf::from("/o/x.conjure.go"),
        };
        assert_eq!(r.path(), Path::new("/o/x.conjure.go"));
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("file.conjure.go");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp = tmp_dir.path().join("file.conjure.go.conjure.tmp");

        let result = atomic_write_with_tmp(&path, b"new content", &tmp);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Running as root ignores directory permissions; nothing to assert then.
        if result.is_ok() {
            return;
        }
        let current = fs::read_to_string(&path).unwrap();
        assert_eq!(current, "original", "original file should be intact");
        assert!(!tmp.exists(), ".conjure.tmp should be cleaned up");
    }
}
