//! `conjure-plugin generate`: write generated code, or verify it with `--verify`.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use conjure_sync::{apply_all, pipeline::ProjectApplyResult, verify_all, WriteResult};

use super::{GlobalArgs, Workspace};

/// Arguments for `conjure-plugin generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Projects to generate (default: all).
    pub projects: Vec<String>,

    /// Compare generated output with disk instead of writing it.
    #[arg(long)]
    pub verify: bool,
}

impl GenerateArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let workspace = Workspace::load(global)?;
        let params = workspace.select(&self.projects)?;

        if self.verify {
            let report = verify_all(&params, &workspace.provider, &workspace.generator)
                .context("verification failed")?;
            if report.is_clean() {
                println!("{} generated code is up to date", "✓".green());
                return Ok(());
            }
            println!(
                "{}",
                "Generated code is out of date. Differences:".red().bold()
            );
            print!("{report}");
            bail!(
                "{} project(s) have stale generated code; run `conjure-plugin generate`",
                report.dirty().count()
            );
        }

        let results = apply_all(&params, &workspace.provider, &workspace.generator)
            .context("generation failed")?;
        for result in &results {
            print_results(result);
        }
        Ok(())
    }
}

fn print_results(result: &ProjectApplyResult) {
    let count = |f: fn(&WriteResult) -> bool| result.writes.iter().filter(|w| f(w)).count();
    let written = count(|w| matches!(w, WriteResult::Written { .. }));
    let deleted = count(|w| matches!(w, WriteResult::Deleted { .. }));
    let unchanged = count(|w| matches!(w, WriteResult::Unchanged { .. }));

    if written == 0 && deleted == 0 {
        println!("✓ '{}' up to date ({unchanged} unchanged)", result.project);
        return;
    }
    println!(
        "✓ '{}' generated ({written} written, {deleted} deleted, {unchanged} unchanged)",
        result.project
    );
    for w in &result.writes {
        let shown = w
            .path()
            .strip_prefix(&result.output_dir)
            .unwrap_or_else(|_| w.path());
        match w {
            WriteResult::Written { .. } => println!("  ✎  {}", shown.display()),
            WriteResult::Deleted { .. } => println!("  ✗  {}", shown.display()),
            WriteResult::Unchanged { .. } => {}
        }
    }
}
