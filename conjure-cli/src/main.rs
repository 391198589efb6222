//! conjure-plugin: generate, verify, check and publish Conjure projects.
//!
//! # Usage
//!
//! ```text
//! conjure-plugin [--project-dir DIR] [--config FILE] [--assets PATH]... generate [--verify] [PROJECT]...
//! conjure-plugin ir <PROJECT>
//! conjure-plugin check-backcompat [PROJECT]...
//! conjure-plugin accept-backcompat-breaks [PROJECT]...
//! conjure-plugin publish --url URL [--username U --password P] [--group-id G] [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    backcompat::{AcceptArgs, CheckArgs},
    generate::GenerateArgs,
    ir::IrArgs,
    publish::PublishArgs,
    GlobalArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "conjure-plugin",
    version,
    about = "Generate code from Conjure definitions and manage published IR",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate code for projects, or verify that generated code is up to date.
    Generate(GenerateArgs),

    /// Print a project's IR with extensions merged.
    Ir(IrArgs),

    /// Check projects for backwards-incompatible API changes.
    CheckBackcompat(CheckArgs),

    /// Record the current IR of projects as the accepted baseline.
    AcceptBackcompatBreaks(AcceptArgs),

    /// Publish IR of projects marked `publish: true`.
    Publish(PublishArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    match cli.command {
        Commands::Generate(args) => args.run(&cli.global),
        Commands::Ir(args) => args.run(&cli.global),
        Commands::CheckBackcompat(args) => args.run(&cli.global),
        Commands::AcceptBackcompatBreaks(args) => args.run(&cli.global),
        Commands::Publish(args) => args.run(&cli.global),
    }
}
