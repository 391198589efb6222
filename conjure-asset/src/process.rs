//! Subprocess plumbing shared by every asset client.

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use tempfile::NamedTempFile;

use crate::error::{io_err, AssetError};

/// Captured result of one asset invocation.
#[derive(Debug)]
pub(crate) struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    /// stdout followed by stderr, trimmed; what a user needs to see.
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim_end();
        let stderr = self.stderr.trim_end();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, _) => stderr.to_string(),
            (false, true) => stdout.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }

    pub fn exit_error(&self, asset: &Path, operation: &'static str) -> AssetError {
        AssetError::ExitStatus {
            asset: asset.to_path_buf(),
            operation,
            status: self.status.to_string(),
            output: self.combined_output(),
        }
    }
}

/// Run `asset` with `args`, blocking until it exits. No timeout is applied.
pub(crate) fn run<I, S>(asset: &Path, args: I) -> Result<Captured, AssetError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(asset)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| AssetError::Spawn {
            asset: asset.to_path_buf(),
            source,
        })?;
    Ok(Captured {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Write IR to a fresh temp file; the file is removed when the handle drops.
pub(crate) fn ir_tempfile(ir: &[u8]) -> Result<NamedTempFile, AssetError> {
    let mut file = tempfile::Builder::new()
        .prefix("conjure-ir-")
        .suffix(".json")
        .tempfile()
        .map_err(|e| io_err(std::env::temp_dir(), e))?;
    file.write_all(ir).map_err(|e| io_err(file.path(), e))?;
    file.flush().map_err(|e| io_err(file.path(), e))?;
    Ok(file)
}
