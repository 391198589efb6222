//! SHA-256 checksums of generated and on-disk files, and the diff between them.
//!
//! A [`ChecksumSet`] maps a path to `Some(checksum)` when the content exists
//! and `None` when the file is absent. Two sets, expected (rendered) and actual
//! (on disk), produce a [`ChecksumDiff`] in path order.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{io_err, SyncError};

/// Middle segment of the file name suffix that marks a file as owned by the
/// plugin: `<stem>.conjure.<ext>`.
pub const OWNERSHIP_MARKER: &str = "conjure";

// ---------------------------------------------------------------------------
// Checksum
// ---------------------------------------------------------------------------

/// Hex-encoded SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checksum(String);

impl Checksum {
    pub fn of(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for human-readable reports.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Checksum of the file at `path`, or `None` if it does not exist.
pub fn file_checksum(path: &Path) -> Result<Option<Checksum>, SyncError> {
    match std::fs::read(path) {
        Ok(content) => Ok(Some(Checksum::of(&content))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

/// True when the file name looks like `<stem>.conjure.<ext>`.
///
/// Files without the marker are never deleted or overwritten on the plugin's
/// own initiative.
pub fn is_generated_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let mut parts = name.rsplitn(3, '.');
    let (Some(ext), Some(marker), Some(stem)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !ext.is_empty() && marker == OWNERSHIP_MARKER && !stem.is_empty()
}

/// Every plugin-owned file under `dir`, sorted. A missing `dir` has none.
pub fn owned_files(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Ok(vec![]),
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(err) => return Err(io_err(dir, err)),
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            io_err(path, e.into())
        })?;
        if entry.file_type().is_file() && is_generated_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// ChecksumSet
// ---------------------------------------------------------------------------

/// Path → checksum (`None` = absent), ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumSet(BTreeMap<PathBuf, Option<Checksum>>);

impl ChecksumSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checksum every path in `paths` as it currently is on disk.
    pub fn on_disk<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Result<Self, SyncError> {
        let mut set = Self::new();
        for path in paths {
            set.insert(path.to_path_buf(), file_checksum(path)?);
        }
        Ok(set)
    }

    pub fn insert(&mut self, path: PathBuf, checksum: Option<Checksum>) {
        self.0.insert(path, checksum);
    }

    /// `None` when the path is not in the set, `Some(None)` when it is but
    /// the file is absent.
    pub fn get(&self, path: &Path) -> Option<Option<&Checksum>> {
        self.0.get(path).map(Option::as_ref)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.0.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, Option<&Checksum>)> {
        self.0.iter().map(|(p, c)| (p.as_path(), c.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ChecksumDiff
// ---------------------------------------------------------------------------

/// How one path differs between generated output and disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffKind {
    /// Exists on disk with different content.
    Changed { on_disk: Checksum, generated: Checksum },
    /// Generated but absent on disk.
    Missing { generated: Checksum },
    /// Owned file on disk that the current generation no longer produces.
    Extra { on_disk: Checksum },
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Changed { on_disk, generated } => write!(
                f,
                "checksum changed from {} to {}",
                on_disk.short(),
                generated.short()
            ),
            DiffKind::Missing { .. } => write!(f, "did not exist before, now exists"),
            DiffKind::Extra { .. } => write!(f, "existed before, no longer exists"),
        }
    }
}

/// Differences between expected and actual checksums, sorted by path.
/// Identical paths are not recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumDiff(BTreeMap<PathBuf, DiffKind>);

impl ChecksumDiff {
    pub fn between(expected: &ChecksumSet, actual: &ChecksumSet) -> Self {
        let mut diff = BTreeMap::new();

        for (path, generated) in expected.iter() {
            let Some(generated) = generated else {
                continue;
            };
            match actual.get(path).flatten() {
                Some(on_disk) if on_disk == generated => {}
                Some(on_disk) => {
                    diff.insert(
                        path.to_path_buf(),
                        DiffKind::Changed {
                            on_disk: on_disk.clone(),
                            generated: generated.clone(),
                        },
                    );
                }
                None => {
                    diff.insert(
                        path.to_path_buf(),
                        DiffKind::Missing {
                            generated: generated.clone(),
                        },
                    );
                }
            }
        }

        for (path, on_disk) in actual.iter() {
            if let (Some(on_disk), false) = (on_disk, expected.contains(path)) {
                diff.insert(
                    path.to_path_buf(),
                    DiffKind::Extra {
                        on_disk: on_disk.clone(),
                    },
                );
            }
        }

        Self(diff)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &Path) -> Option<&DiffKind> {
        self.0.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &DiffKind)> {
        self.0.iter().map(|(p, k)| (p.as_path(), k))
    }

    /// Paths that apply mode deletes.
    pub fn extra(&self) -> impl Iterator<Item = &Path> {
        self.iter()
            .filter(|(_, k)| matches!(k, DiffKind::Extra { .. }))
            .map(|(p, _)| p)
    }

    /// One line per differing path, relative to `base` where possible,
    /// prefixed with `indent`.
    pub fn describe(&self, base: &Path, indent: &str) -> String {
        let mut out = String::new();
        for (path, kind) in self.iter() {
            let shown = path.strip_prefix(base).unwrap_or(path);
            out.push_str(&format!("{indent}{}: {kind}\n", shown.display()));
        }
        out
    }
}
