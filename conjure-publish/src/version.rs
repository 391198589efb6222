//! Version derivation from git.
//!
//! `git describe --tags --first-parent` gives the base version; a leading
//! `v` is dropped, and `.dirty` is appended when the working tree has
//! uncommitted changes.

use std::path::Path;
use std::process::Command;

use crate::error::PublishError;

const DIRTY_SUFFIX: &str = ".dirty";

/// Compute the version of the repository containing `dir`.
pub fn project_version(dir: &Path) -> Result<String, PublishError> {
    let described = git(dir, &["describe", "--tags", "--first-parent"])?;
    let status = git(dir, &["status", "--porcelain"])?;
    let version = format_version(&described, !status.trim().is_empty())?;
    tracing::debug!("derived version {version} for {}", dir.display());
    Ok(version)
}

/// Turn `git describe` output into a version string.
pub fn format_version(described: &str, dirty: bool) -> Result<String, PublishError> {
    let trimmed = described.trim();
    let base = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if base.is_empty() || base.chars().any(char::is_whitespace) {
        return Err(PublishError::InvalidVersion {
            output: described.to_string(),
        });
    }
    Ok(if dirty {
        format!("{base}{DIRTY_SUFFIX}")
    } else {
        base.to_string()
    })
}

fn git(dir: &Path, args: &[&str]) -> Result<String, PublishError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| PublishError::GitSpawn {
            dir: dir.to_path_buf(),
            source,
        })?;
    if !output.status.success() {
        return Err(PublishError::GitFailed {
            dir: dir.to_path_buf(),
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
