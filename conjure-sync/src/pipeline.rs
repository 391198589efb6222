//! Per-project generation pipeline used by the CLI.
//!
//! ```text
//! IrSource → IrProvider → Generator → [OutputFile] → reconcile (verify | apply)
//! ```
//!
//! Projects are processed one at a time in the order given (callers pass the
//! sorted project list). Apply stops at the first failing project; verify
//! checks every project and returns an aggregate [`VerifyReport`].

use std::fmt;
use std::path::PathBuf;

use conjure_core::{ConjureProjectParam, ProjectName};
use conjure_ir::{GenerateRequest, Generator, IrProvider, OutputFile};

use crate::checksum::ChecksumDiff;
use crate::error::SyncError;
use crate::reconcile;
use crate::writer::WriteResult;

/// Outcome of applying generation to one project.
#[derive(Debug)]
pub struct ProjectApplyResult {
    pub project: ProjectName,
    pub output_dir: PathBuf,
    pub writes: Vec<WriteResult>,
}

/// Verification result for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectVerifyResult {
    pub project: ProjectName,
    pub output_dir: PathBuf,
    pub diff: ChecksumDiff,
}

/// Verification results for every checked project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub projects: Vec<ProjectVerifyResult>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.projects.iter().all(|p| p.diff.is_empty())
    }

    pub fn dirty(&self) -> impl Iterator<Item = &ProjectVerifyResult> {
        self.projects.iter().filter(|p| !p.diff.is_empty())
    }
}

impl fmt::Display for VerifyReport {
    /// Per-project indented listing of differing paths; empty when clean.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for project in self.dirty() {
            writeln!(f, "  {}:", project.project)?;
            f.write_str(&project.diff.describe(&project.output_dir, "    "))?;
        }
        Ok(())
    }
}

/// Resolve IR and run the generator for one project.
pub fn output_files(
    param: &ConjureProjectParam,
    provider: &IrProvider,
    generator: &dyn Generator,
) -> Result<Vec<OutputFile>, SyncError> {
    let ir = provider.ir_bytes(&param.ir_source)?;
    Ok(generator.generate(&ir, &GenerateRequest::from_param(param))?)
}

/// Generate and write every project. Stops at the first error.
pub fn apply_all(
    params: &[&ConjureProjectParam],
    provider: &IrProvider,
    generator: &dyn Generator,
) -> Result<Vec<ProjectApplyResult>, SyncError> {
    let mut results = Vec::with_capacity(params.len());
    for param in params {
        let files = output_files(param, provider, generator)?;
        let writes = reconcile::apply(&files, &param.output_dir, param.skip_delete_generated_files)?;
        results.push(ProjectApplyResult {
            project: param.name.clone(),
            output_dir: param.output_dir.clone(),
            writes,
        });
    }
    Ok(results)
}

/// Generate every project in memory and compare with disk. Never writes.
pub fn verify_all(
    params: &[&ConjureProjectParam],
    provider: &IrProvider,
    generator: &dyn Generator,
) -> Result<VerifyReport, SyncError> {
    let mut report = VerifyReport::default();
    for param in params {
        let files = output_files(param, provider, generator)?;
        let diff = reconcile::verify(&files, &param.output_dir, param.skip_delete_generated_files)?;
        if !diff.is_empty() {
            tracing::debug!("project '{}' differs in {} path(s)", param.name, diff.len());
        }
        report.projects.push(ProjectVerifyResult {
            project: param.name.clone(),
            output_dir: param.output_dir.clone(),
            diff,
        });
    }
    Ok(report)
}
