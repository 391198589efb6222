//! Code generation seam: IR bytes in, [`OutputFile`]s out.
//!
//! The real IR-to-source generators are separate executables following the
//! conjure generator CLI convention:
//!
//! ```text
//! <generator> generate <ir.json> <output-dir> [--server] [--cli] [--visitor]
//! ```
//!
//! [`ExternalGenerator`] runs one into a scratch directory and turns every file
//! it wrote into an in-memory [`OutputFile`] rooted at the project's real output
//! directory. Nothing under the real output directory is touched here; that is
//! the reconciliation engine's job.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use walkdir::WalkDir;

use conjure_core::{ConjureProjectParam, GenerationFeatures, ProjectName};

use crate::error::{io_err, IrError};
use crate::output::OutputFile;

/// Everything a generator needs to know about the project being generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub project: ProjectName,
    pub output_dir: PathBuf,
    pub features: GenerationFeatures,
}

impl GenerateRequest {
    pub fn from_param(param: &ConjureProjectParam) -> Self {
        Self {
            project: param.name.clone(),
            output_dir: param.output_dir.clone(),
            features: param.features,
        }
    }
}

/// Produces the complete set of files a project's output directory should contain.
pub trait Generator {
    fn generate(&self, ir: &[u8], request: &GenerateRequest) -> Result<Vec<OutputFile>, IrError>;
}

/// Drives an external generator executable.
#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    executable: PathBuf,
}

impl ExternalGenerator {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn args(&self, ir_file: &Path, staging: &Path, features: GenerationFeatures) -> Vec<String> {
        let mut args = vec![
            "generate".to_string(),
            ir_file.to_string_lossy().into_owned(),
            staging.to_string_lossy().into_owned(),
        ];
        if features.server {
            args.push("--server".to_string());
        }
        if features.cli {
            args.push("--cli".to_string());
        }
        if features.visitor {
            args.push("--visitor".to_string());
        }
        args
    }
}

impl Generator for ExternalGenerator {
    fn generate(&self, ir: &[u8], request: &GenerateRequest) -> Result<Vec<OutputFile>, IrError> {
        let scratch = tempfile::tempdir().map_err(|e| io_err(std::env::temp_dir(), e))?;
        let ir_file = scratch.path().join("ir.json");
        std::fs::write(&ir_file, ir).map_err(|e| io_err(&ir_file, e))?;
        let staging = scratch.path().join("out");
        std::fs::create_dir_all(&staging).map_err(|e| io_err(&staging, e))?;

        tracing::debug!(
            "running {} for project '{}'",
            self.executable.display(),
            request.project
        );
        let result = Command::new(&self.executable)
            .args(self.args(&ir_file, &staging, request.features))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| IrError::Spawn {
                program: self.executable.clone(),
                source,
            })?;
        if !result.status.success() {
            return Err(IrError::CommandFailed {
                program: self.executable.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        collect_outputs(&staging, &request.output_dir)
    }
}

/// Read every file under `staging` into an [`OutputFile`] at the same relative
/// location under `output_dir`. Sorted by path.
fn collect_outputs(staging: &Path, output_dir: &Path) -> Result<Vec<OutputFile>, IrError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(staging).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(staging).to_path_buf();
            io_err(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(staging)
            .unwrap_or(entry.path());
        let content = std::fs::read(entry.path()).map_err(|e| io_err(entry.path(), e))?;
        files.push(OutputFile::from_bytes(output_dir.join(relative), content));
    }
    Ok(files)
}
