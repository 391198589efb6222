//! Versioned YAML plugin configuration.
//!
//! # Loading flow
//!
//! ```text
//! read file → probe `version` → (v1: legacy::upgrade) → ConfigV2
//!           → to_params(project_dir) → validate names + output dirs
//! ```
//!
//! A missing `version` key is treated as version 1.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::legacy::{self, ConfigV1};
use crate::types::{
    resolve_path, ConjureProjectParam, ConjureProjectParams, GenerationFeatures, IrSource,
    ProjectName, ToolPaths,
};

/// Default config file name, relative to the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "conjure-plugin.yml";

/// The version this crate writes and works with internally.
pub const CURRENT_VERSION: u64 = 2;

// ---------------------------------------------------------------------------
// 1. Raw schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigV2 {
    #[serde(default)]
    pub allow_conflicting_output_dirs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conjure_compiler: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<PathBuf>,
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfigV2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfigV2 {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub ir_locator: Option<IrLocatorConfig>,
    #[serde(default)]
    pub group_id: Option<String>,
    /// Defaults to `true` for YAML-backed projects and `false` otherwise.
    #[serde(default)]
    pub publish: Option<bool>,
    #[serde(default)]
    pub server: bool,
    #[serde(default)]
    pub cli: bool,
    #[serde(default)]
    pub visitor: bool,
    #[serde(default)]
    pub skip_conjure_backcompat: bool,
    /// Defaults to `false`: stale owned files are cleaned up.
    #[serde(default)]
    pub skip_delete_generated_files: Option<bool>,
    #[serde(default)]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

/// `ir-locator` is either a bare string (type auto-detected) or a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IrLocatorConfig {
    Plain(String),
    Detailed {
        #[serde(rename = "type", default)]
        kind: LocatorType,
        locator: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorType {
    #[default]
    Auto,
    Yaml,
    IrFile,
    Remote,
}

// ---------------------------------------------------------------------------
// 2. Load / parse
// ---------------------------------------------------------------------------

/// Load and resolve the config at `path`; relative paths resolve against
/// `project_dir`.
pub fn load_at(path: &Path, project_dir: &Path) -> Result<ConjureProjectParams, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(io_err(path, e)),
    };
    let config = parse(&contents, path)?;
    config.to_params(project_dir)
}

/// Parse YAML of any supported version into the current schema.
///
/// `path` is only used for error context.
pub fn parse(contents: &str, path: &Path) -> Result<ConfigV2, ConfigError> {
    let parse_err = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    // An empty document is a valid config with no projects.
    if contents.trim().is_empty() {
        return Ok(ConfigV2::default());
    }

    let mut raw: serde_yaml::Value = serde_yaml::from_str(contents).map_err(parse_err)?;
    let version = config_version(&raw)?;
    // Unknown keys are rejected, so drop the one key the schemas do not model.
    if let serde_yaml::Value::Mapping(map) = &mut raw {
        map.remove("version");
    }
    match version {
        1 => {
            let v1: ConfigV1 = serde_yaml::from_value(raw).map_err(parse_err)?;
            Ok(legacy::upgrade(v1))
        }
        CURRENT_VERSION => serde_yaml::from_value(raw).map_err(parse_err),
        other => Err(ConfigError::UnsupportedVersion {
            version: other.to_string(),
        }),
    }
}

fn config_version(raw: &serde_yaml::Value) -> Result<u64, ConfigError> {
    let Some(version) = raw.get("version") else {
        return Ok(1);
    };
    let parsed = match version {
        serde_yaml::Value::Number(n) => n.as_u64(),
        serde_yaml::Value::String(s) => s.trim().parse().ok(),
        serde_yaml::Value::Null => Some(1),
        _ => None,
    };
    parsed.ok_or_else(|| ConfigError::UnsupportedVersion {
        version: serde_yaml::to_string(version)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// 3. Resolve
// ---------------------------------------------------------------------------

impl ConfigV2 {
    /// Resolve every project against `project_dir` and validate the result.
    ///
    /// A relative `project_dir` is taken relative to the current directory,
    /// so every resolved path is absolute.
    pub fn to_params(&self, project_dir: &Path) -> Result<ConjureProjectParams, ConfigError> {
        let project_dir = absolute_dir(project_dir)?;
        let project_dir = project_dir.as_path();
        let mut params = Vec::with_capacity(self.projects.len());
        for (name, project) in &self.projects {
            validate_project_name(name)?;
            params.push(project.to_param(name, project_dir)?);
        }

        if !self.allow_conflicting_output_dirs {
            validate_output_dirs(&params)?;
        }

        let tools = ToolPaths {
            conjure_compiler: self
                .conjure_compiler
                .as_deref()
                .map(|p| resolve_tool(project_dir, p)),
            generator: self.generator.as_deref().map(|p| resolve_tool(project_dir, p)),
        };
        Ok(ConjureProjectParams::new(
            project_dir.to_path_buf(),
            tools,
            params,
        ))
    }
}

impl ProjectConfigV2 {
    fn to_param(&self, name: &str, project_dir: &Path) -> Result<ConjureProjectParam, ConfigError> {
        let locator = self
            .ir_locator
            .as_ref()
            .ok_or_else(|| ConfigError::MissingIrLocator {
                project: name.to_string(),
            })?;
        let ir_source = resolve_locator(name, locator, project_dir)?;
        let publish = self
            .publish
            .unwrap_or_else(|| ir_source.is_generated_from_yaml());

        Ok(ConjureProjectParam {
            name: ProjectName::from(name),
            group_id: self.group_id.clone(),
            output_dir: normalize(&resolve_path(project_dir, &self.output_dir)),
            ir_source,
            features: GenerationFeatures {
                server: self.server,
                cli: self.cli,
                visitor: self.visitor,
            },
            publish,
            skip_backcompat: self.skip_conjure_backcompat,
            skip_delete_generated_files: self.skip_delete_generated_files.unwrap_or(false),
            extensions: self.extensions.clone(),
        })
    }
}

fn resolve_locator(
    project: &str,
    locator: &IrLocatorConfig,
    project_dir: &Path,
) -> Result<IrSource, ConfigError> {
    let (kind, value) = match locator {
        IrLocatorConfig::Plain(value) => (LocatorType::Auto, value.as_str()),
        IrLocatorConfig::Detailed { kind, locator } => (*kind, locator.as_str()),
    };
    if value.trim().is_empty() {
        return Err(ConfigError::MissingIrLocator {
            project: project.to_string(),
        });
    }

    let kind = match kind {
        LocatorType::Auto if is_url(value) => LocatorType::Remote,
        LocatorType::Auto if value.ends_with(".json") => LocatorType::IrFile,
        LocatorType::Auto => LocatorType::Yaml,
        explicit => explicit,
    };

    let local = || normalize(&resolve_path(project_dir, Path::new(value)));
    match kind {
        LocatorType::Remote if !is_url(value) => Err(ConfigError::InvalidIrLocator {
            project: project.to_string(),
            reason: format!("'{value}' is not an http(s) URL"),
        }),
        LocatorType::Remote => Ok(IrSource::Remote {
            url: value.to_string(),
        }),
        LocatorType::IrFile => Ok(IrSource::IrFile { path: local() }),
        LocatorType::Yaml | LocatorType::Auto => Ok(IrSource::Yaml { path: local() }),
    }
}

fn absolute_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    if dir.is_absolute() {
        return Ok(normalize(dir));
    }
    let cwd = std::env::current_dir().map_err(|e| io_err(dir, e))?;
    Ok(normalize(&cwd.join(dir)))
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Bare command names (`conjure`) are looked up on `PATH`; anything with a
/// separator resolves against the project directory.
fn resolve_tool(project_dir: &Path, tool: &Path) -> PathBuf {
    if tool.components().count() == 1 && !tool.is_absolute() {
        tool.to_path_buf()
    } else {
        resolve_path(project_dir, tool)
    }
}

// ---------------------------------------------------------------------------
// 4. Validation
// ---------------------------------------------------------------------------

/// Project names become directory names and artifact IDs.
pub fn validate_project_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidProjectName {
        name: name.to_string(),
        reason,
    };
    let Some(first) = name.chars().next() else {
        return Err(invalid("must not be empty"));
    };
    if !first.is_ascii_alphanumeric() {
        return Err(invalid("must start with an ASCII letter or digit"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid(
            "may only contain ASCII letters, digits, '-', '_' and '.'",
        ));
    }
    Ok(())
}

/// Reject output directories that coincide or nest.
///
/// `params` is checked pairwise; the first conflict found (in name order)
/// is reported.
pub fn validate_output_dirs(params: &[ConjureProjectParam]) -> Result<(), ConfigError> {
    let mut sorted: Vec<&ConjureProjectParam> = params.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    for (i, first) in sorted.iter().enumerate() {
        for second in &sorted[i + 1..] {
            let a = normalize(&first.output_dir);
            let b = normalize(&second.output_dir);
            if a.starts_with(&b) || b.starts_with(&a) {
                return Err(ConfigError::ConflictingOutputDirs {
                    first: first.name.0.clone(),
                    first_dir: a,
                    second: second.name.0.clone(),
                    second_dir: b,
                });
            }
        }
    }
    Ok(())
}

/// Lexically normalise a path: drop `.` and fold `..` where possible.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
