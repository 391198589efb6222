//! `conjure-plugin ir <project>`: print a project's IR.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use conjure_asset::{apply_extensions, ExtensionsRequest};
use conjure_publish::project_version;

use super::{GlobalArgs, Workspace};

/// Version handed to extensions providers when git cannot supply one.
const UNKNOWN_VERSION: &str = "0.0.0-unversioned";

/// Arguments for `conjure-plugin ir`.
#[derive(Args, Debug)]
pub struct IrArgs {
    /// Project whose IR to print.
    pub project: String,
}

impl IrArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let workspace = Workspace::load(global)?;
        let param = workspace.project(&self.project)?;

        let ir = workspace
            .provider
            .ir_bytes(&param.ir_source)
            .with_context(|| format!("failed to resolve IR for '{}'", param.name))?;

        let version = project_version(workspace.project_dir()).unwrap_or_else(|e| {
            tracing::warn!("{e}; using version {UNKNOWN_VERSION}");
            UNKNOWN_VERSION.to_string()
        });
        let request = ExtensionsRequest {
            project: param.name.as_str(),
            group_id: param.group_id.as_deref(),
            version: &version,
            config_file: &workspace.config_file,
        };
        let ir = apply_extensions(
            &ir,
            &param.extensions,
            workspace.assets.extensions_providers(),
            &request,
        )
        .with_context(|| format!("failed to merge extensions for '{}'", param.name))?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&ir).context("failed to write IR")?;
        writeln!(stdout).context("failed to write IR")?;
        Ok(())
    }
}
