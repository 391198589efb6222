//! Output-directory reconciliation.
//!
//! Given the files a generation run produced and the directory they belong
//! in, work out what differs on disk and, in apply mode, fix it:
//!
//! 1. Render every [`OutputFile`] and checksum it (expected set).
//! 2. Pick candidate paths: the generated paths, plus every owned file under
//!    the output directory unless `skip_delete` is set.
//! 3. Checksum the candidates as they are on disk (actual set).
//! 4. Diff expected against actual.
//! 5. Verify: return the diff.
//! 6. Apply: delete `Extra` paths, then write `Changed` and `Missing` files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use conjure_ir::OutputFile;

use crate::checksum::{owned_files, Checksum, ChecksumDiff, ChecksumSet, DiffKind};
use crate::error::SyncError;
use crate::writer::{atomic_write, remove_stale, WriteResult};

/// Everything computed before any mutation happens.
#[derive(Debug)]
pub struct Plan {
    pub output_dir: PathBuf,
    pub expected: ChecksumSet,
    pub actual: ChecksumSet,
    pub diff: ChecksumDiff,
    rendered: BTreeMap<PathBuf, Vec<u8>>,
}

/// Compute the [`Plan`] for one output directory.
pub fn plan(files: &[OutputFile], output_dir: &Path, skip_delete: bool) -> Result<Plan, SyncError> {
    let mut rendered = BTreeMap::new();
    let mut expected = ChecksumSet::new();
    for file in files {
        let content = file.render()?;
        let path = file.path().to_path_buf();
        if expected.contains(&path) {
            return Err(SyncError::DuplicateOutput { path });
        }
        expected.insert(path.clone(), Some(Checksum::of(&content)));
        rendered.insert(path, content);
    }

    let mut candidates: Vec<PathBuf> = rendered.keys().cloned().collect();
    if !skip_delete {
        candidates.extend(owned_files(output_dir)?);
    }
    candidates.sort();
    candidates.dedup();
    let actual = ChecksumSet::on_disk(candidates.iter().map(PathBuf::as_path))?;

    let diff = ChecksumDiff::between(&expected, &actual);
    Ok(Plan {
        output_dir: output_dir.to_path_buf(),
        expected,
        actual,
        diff,
        rendered,
    })
}

impl Plan {
    /// Carry out the plan. Deletions happen before writes.
    pub fn execute(self) -> Result<Vec<WriteResult>, SyncError> {
        let mut results = Vec::new();

        for path in self.diff.extra() {
            remove_stale(path)?;
            results.push(WriteResult::Deleted {
                path: path.to_path_buf(),
            });
        }

        for (path, content) in &self.rendered {
            match self.diff.get(path) {
                Some(DiffKind::Changed { .. }) | Some(DiffKind::Missing { .. }) => {
                    atomic_write(path, content)?;
                    results.push(WriteResult::Written { path: path.clone() });
                }
                _ => {
                    tracing::debug!("unchanged: {}", path.display());
                    results.push(WriteResult::Unchanged { path: path.clone() });
                }
            }
        }

        Ok(results)
    }
}

/// Report how `output_dir` differs from `files` without touching disk.
pub fn verify(
    files: &[OutputFile],
    output_dir: &Path,
    skip_delete: bool,
) -> Result<ChecksumDiff, SyncError> {
    Ok(plan(files, output_dir, skip_delete)?.diff)
}

/// Make `output_dir` match `files`.
pub fn apply(
    files: &[OutputFile],
    output_dir: &Path,
    skip_delete: bool,
) -> Result<Vec<WriteResult>, SyncError> {
    plan(files, output_dir, skip_delete)?.execute()
}
