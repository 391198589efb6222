//! Subcommands and the state they share.

pub mod backcompat;
pub mod generate;
pub mod ir;
pub mod publish;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;

use conjure_asset::Assets;
use conjure_core::{config, ConjureProjectParam, ConjureProjectParams};
use conjure_ir::{ExternalGenerator, IrProvider};

/// Generator used when neither config nor `--generator` names one.
const DEFAULT_GENERATOR: &str = "conjure-go";

/// Flags accepted by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory that relative config paths resolve against.
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Config file [default: <project-dir>/conjure-plugin.yml].
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Asset executable; repeat for several.
    #[arg(long = "assets", global = true)]
    pub assets: Vec<PathBuf>,

    /// Conjure compiler, overriding `conjure-compiler` in config.
    #[arg(long, global = true)]
    pub conjure: Option<PathBuf>,

    /// Code generator, overriding `generator` in config.
    #[arg(long, global = true)]
    pub generator: Option<PathBuf>,

    /// Log progress at info level (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Loaded config plus the tools and assets derived from it.
pub struct Workspace {
    pub params: ConjureProjectParams,
    pub config_file: PathBuf,
    pub provider: IrProvider,
    pub generator: ExternalGenerator,
    pub assets: Assets,
}

impl Workspace {
    /// Load config and assets. Every configuration error surfaces here,
    /// before any project is processed.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let project_dir = std::path::absolute(&global.project_dir).with_context(|| {
            format!("failed to resolve project dir {}", global.project_dir.display())
        })?;
        let config_file = global
            .config
            .clone()
            .unwrap_or_else(|| project_dir.join(config::DEFAULT_CONFIG_FILE));
        let params = config::load_at(&config_file, &project_dir)
            .with_context(|| format!("failed to load config {}", config_file.display()))?;

        let compiler = global
            .conjure
            .clone()
            .or_else(|| params.tools.conjure_compiler.clone());
        let generator = global
            .generator
            .clone()
            .or_else(|| params.tools.generator.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GENERATOR));

        let assets = Assets::load(&global.assets).context("failed to load assets")?;

        Ok(Self {
            params,
            config_file,
            provider: IrProvider::new(compiler),
            generator: ExternalGenerator::new(generator),
            assets,
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.params.project_dir
    }

    /// Named projects in sorted order, or all of them.
    pub fn select(&self, names: &[String]) -> Result<Vec<&ConjureProjectParam>> {
        self.params
            .select(names)
            .map_err(|unknown| self.unknown_project(&unknown))
    }

    pub fn project(&self, name: &str) -> Result<&ConjureProjectParam> {
        self.params
            .get(name)
            .ok_or_else(|| self.unknown_project(name))
    }

    fn unknown_project(&self, name: &str) -> anyhow::Error {
        let known: Vec<String> = self.params.names().iter().map(|n| n.to_string()).collect();
        anyhow!(
            "unknown project '{name}'; configured projects: {}",
            known.join(", ")
        )
    }
}
