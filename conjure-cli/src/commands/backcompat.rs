//! `conjure-plugin check-backcompat` and `accept-backcompat-breaks`.
//!
//! Only projects whose IR comes from YAML and that are not marked
//! `skip-conjure-backcompat` are considered. Check runs every project and
//! fails at the end if any project failed; accept stops at the first error.

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;

use conjure_asset::{BackcompatAsset, BackcompatOutcome, BackcompatRequest};
use conjure_core::ConjureProjectParam;

use super::{GlobalArgs, Workspace};

/// Arguments for `conjure-plugin check-backcompat`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Projects to check (default: all).
    pub projects: Vec<String>,
}

/// Arguments for `conjure-plugin accept-backcompat-breaks`.
#[derive(Args, Debug)]
pub struct AcceptArgs {
    /// Projects to accept (default: all).
    pub projects: Vec<String>,
}

fn eligible<'a>(params: Vec<&'a ConjureProjectParam>) -> Vec<&'a ConjureProjectParam> {
    params
        .into_iter()
        .filter(|p| {
            if p.skip_backcompat {
                tracing::debug!("skipping '{}': skip-conjure-backcompat is set", p.name);
                false
            } else if !p.ir_source.is_generated_from_yaml() {
                tracing::debug!("skipping '{}': IR is not generated from YAML", p.name);
                false
            } else {
                true
            }
        })
        .collect()
}

fn group_id(param: &ConjureProjectParam) -> Result<&str> {
    param
        .group_id
        .as_deref()
        .ok_or_else(|| anyhow!("project '{}' has no group-id", param.name))
}

fn backcompat_asset(workspace: &Workspace) -> Option<&BackcompatAsset> {
    let asset = workspace.assets.backcompat();
    if asset.is_none() {
        println!("No backcompat asset configured; nothing to do.");
    }
    asset
}

impl CheckArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let workspace = Workspace::load(global)?;
        let params = eligible(workspace.select(&self.projects)?);
        let Some(asset) = backcompat_asset(&workspace) else {
            return Ok(());
        };

        let mut failed = Vec::new();
        for param in params {
            let outcome = check_project(&workspace, asset, param);
            match outcome {
                Ok(BackcompatOutcome::Compatible) => {
                    println!("{} '{}' is backwards compatible", "✓".green(), param.name);
                }
                Ok(BackcompatOutcome::Incompatible { output }) => {
                    println!(
                        "{}",
                        format!("'{}' has backwards-incompatible changes:", param.name)
                            .red()
                            .bold()
                    );
                    print!("{output}");
                    if !output.is_empty() && !output.ends_with('\n') {
                        println!();
                    }
                    println!(
                        "If these breaks are intentional, run `conjure-plugin accept-backcompat-breaks {}`",
                        param.name
                    );
                    failed.push(param.name.to_string());
                }
                Ok(BackcompatOutcome::ExecutionError(e)) => {
                    eprintln!("{} '{}': {e}", "error:".red().bold(), param.name);
                    failed.push(param.name.to_string());
                }
                Err(e) => {
                    eprintln!("{} '{}': {e:#}", "error:".red().bold(), param.name);
                    failed.push(param.name.to_string());
                }
            }
        }

        if !failed.is_empty() {
            bail!(
                "backcompat check failed for {} project(s): {}",
                failed.len(),
                failed.join(", ")
            );
        }
        Ok(())
    }
}

fn check_project(
    workspace: &Workspace,
    asset: &BackcompatAsset,
    param: &ConjureProjectParam,
) -> Result<BackcompatOutcome> {
    let group_id = group_id(param)?;
    let ir = workspace
        .provider
        .ir_bytes(&param.ir_source)
        .with_context(|| format!("failed to resolve IR for '{}'", param.name))?;
    Ok(asset.check(&BackcompatRequest {
        project: param.name.as_str(),
        group_id,
        ir: &ir,
        project_dir: workspace.project_dir(),
    }))
}

impl AcceptArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let workspace = Workspace::load(global)?;
        let params = eligible(workspace.select(&self.projects)?);
        let Some(asset) = backcompat_asset(&workspace) else {
            return Ok(());
        };

        for param in params {
            let group_id = group_id(param)?;
            let ir = workspace
                .provider
                .ir_bytes(&param.ir_source)
                .with_context(|| format!("failed to resolve IR for '{}'", param.name))?;
            asset
                .accept(&BackcompatRequest {
                    project: param.name.as_str(),
                    group_id,
                    ir: &ir,
                    project_dir: workspace.project_dir(),
                })
                .with_context(|| format!("failed to accept backcompat breaks for '{}'", param.name))?;
            println!("{} accepted current API of '{}'", "✓".green(), param.name);
        }
        Ok(())
    }
}
