//! Version 1 config schema and its translation into the current schema.
//!
//! Differences from version 2:
//! - `accept-funcs` is the old name of the `visitor` switch.
//! - Generated code lands in `<output-dir>/<project>` unless
//!   `omit-top-level-project-dir` is set.
//! - `skip-delete-generated-files` defaults to `true`: v1 never cleaned up
//!   files it did not generate in the current run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigV2, IrLocatorConfig, ProjectConfigV2};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigV1 {
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectConfigV1>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfigV1 {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub ir_locator: Option<IrLocatorConfig>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub publish: Option<bool>,
    #[serde(default)]
    pub server: bool,
    #[serde(default)]
    pub cli: bool,
    #[serde(default)]
    pub accept_funcs: bool,
    #[serde(default)]
    pub omit_top_level_project_dir: bool,
    #[serde(default)]
    pub skip_conjure_backcompat: bool,
    #[serde(default)]
    pub skip_delete_generated_files: Option<bool>,
    #[serde(default)]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

/// Translate a v1 document into the v2 shape.
///
/// v1 has no notion of conflicting output directories because every project
/// wrote into its own `<output-dir>/<project>` subdirectory; the upgrade keeps
/// conflict checking on.
pub fn upgrade(v1: ConfigV1) -> ConfigV2 {
    let projects = v1
        .projects
        .into_iter()
        .map(|(name, p)| {
            let output_dir = if p.omit_top_level_project_dir {
                p.output_dir
            } else {
                p.output_dir.join(&name)
            };
            let upgraded = ProjectConfigV2 {
                output_dir,
                ir_locator: p.ir_locator,
                group_id: p.group_id,
                publish: p.publish,
                server: p.server,
                cli: p.cli,
                visitor: p.accept_funcs,
                skip_conjure_backcompat: p.skip_conjure_backcompat,
                skip_delete_generated_files: Some(p.skip_delete_generated_files.unwrap_or(true)),
                extensions: p.extensions,
            };
            (name, upgraded)
        })
        .collect();

    ConfigV2 {
        allow_conflicting_output_dirs: false,
        conjure_compiler: None,
        generator: None,
        projects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_nests_output_under_project_name() {
        let v1: ConfigV1 = serde_yaml::from_str(
            "projects:\n  api:\n    output-dir: gen\n    ir-locator: api.yml\n    accept-funcs: true\n",
        )
        .expect("parse");
        let v2 = upgrade(v1);
        let api = &v2.projects["api"];
        assert_eq!(api.output_dir, PathBuf::from("gen/api"));
        assert!(api.visitor);
        assert_eq!(api.skip_delete_generated_files, Some(true));
    }

    #[test]
    fn upgrade_honours_omit_top_level_project_dir() {
        let v1: ConfigV1 = serde_yaml::from_str(
            "projects:\n  api:\n    output-dir: gen\n    ir-locator: api.yml\n    omit-top-level-project-dir: true\n    skip-delete-generated-files: false\n",
        )
        .expect("parse");
        let v2 = upgrade(v1);
        let api = &v2.projects["api"];
        assert_eq!(api.output_dir, PathBuf::from("gen"));
        assert_eq!(api.skip_delete_generated_files, Some(false));
    }
}
