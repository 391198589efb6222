//! Domain types for conjure project configuration.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Everything in here is the canonical, already-upgraded representation:
//! raw YAML shapes live in [`crate::config`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a conjure project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl ProjectName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Where a project's conjure IR comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IrSource {
    /// Conjure YAML (a file or a directory of files) compiled into IR.
    Yaml { path: PathBuf },
    /// A pre-built IR JSON file on disk.
    IrFile { path: PathBuf },
    /// IR JSON downloaded over HTTP(S).
    Remote { url: String },
}

impl IrSource {
    /// True when the project owns the YAML source of truth for its IR.
    ///
    /// Only these projects are subject to backcompat checks: an IR file or a
    /// remote artifact is authored elsewhere.
    pub fn is_generated_from_yaml(&self) -> bool {
        matches!(self, IrSource::Yaml { .. })
    }
}

impl fmt::Display for IrSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrSource::Yaml { path } => write!(f, "yaml:{}", path.display()),
            IrSource::IrFile { path } => write!(f, "ir-file:{}", path.display()),
            IrSource::Remote { url } => write!(f, "remote:{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Code generation switches forwarded to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationFeatures {
    pub server: bool,
    pub cli: bool,
    pub visitor: bool,
}

/// One project's fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConjureProjectParam {
    pub name: ProjectName,
    pub group_id: Option<String>,
    /// Absolute output directory.
    pub output_dir: PathBuf,
    pub ir_source: IrSource,
    pub features: GenerationFeatures,
    pub publish: bool,
    pub skip_backcompat: bool,
    pub skip_delete_generated_files: bool,
    /// Static extensions merged into the IR before any provider runs.
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

/// Tool locations that come from configuration rather than from a project.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolPaths {
    pub conjure_compiler: Option<PathBuf>,
    pub generator: Option<PathBuf>,
}

/// All projects of one config file, sorted by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConjureProjectParams {
    /// Directory every relative config path was resolved against.
    pub project_dir: PathBuf,
    pub tools: ToolPaths,
    params: Vec<ConjureProjectParam>,
}

impl ConjureProjectParams {
    /// Build from an unordered list; the result is sorted by project name.
    pub fn new(project_dir: PathBuf, tools: ToolPaths, mut params: Vec<ConjureProjectParam>) -> Self {
        params.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            project_dir,
            tools,
            params,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConjureProjectParam> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ConjureProjectParam> {
        self.params.iter().find(|p| p.name.0 == name)
    }

    pub fn names(&self) -> Vec<&ProjectName> {
        self.params.iter().map(|p| &p.name).collect()
    }

    /// Select the named projects (all of them when `names` is empty).
    ///
    /// Output keeps the sorted order regardless of the order of `names`.
    /// Returns the first unknown name as the error.
    pub fn select(&self, names: &[String]) -> Result<Vec<&ConjureProjectParam>, String> {
        if names.is_empty() {
            return Ok(self.params.iter().collect());
        }
        if let Some(unknown) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(unknown.clone());
        }
        Ok(self
            .params
            .iter()
            .filter(|p| names.iter().any(|n| *n == p.name.0))
            .collect())
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
