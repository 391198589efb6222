//! Staging of publishable artifacts.
//!
//! Each project is staged into its own temp dir as
//!
//! ```text
//! <name>-<version>.conjure.json
//! <name>-<version>.pom
//! ```
//!
//! and uploaded under `<group path>/<name>/<version>/`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{io_err, PublishError};

/// Maven-style coordinates of one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl Coordinates {
    /// `com.example` + `api` + `1.0.0` → `com/example/api/1.0.0`.
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version
        )
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}-{}.{extension}", self.artifact_id, self.version)
    }
}

/// Files staged for upload. The staging dir is removed on drop.
#[derive(Debug)]
pub struct StagedArtifact {
    pub coordinates: Coordinates,
    pub files: Vec<PathBuf>,
    dir: TempDir,
}

impl StagedArtifact {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Write the IR and a POM describing it into a fresh staging dir.
pub fn stage(coordinates: Coordinates, ir: &[u8]) -> Result<StagedArtifact, PublishError> {
    let dir = tempfile::Builder::new()
        .prefix("conjure-publish-")
        .tempdir()
        .map_err(|e| io_err(std::env::temp_dir(), e))?;

    let ir_path = dir.path().join(coordinates.file_name("conjure.json"));
    fs::write(&ir_path, ir).map_err(|e| io_err(&ir_path, e))?;

    let pom_path = dir.path().join(coordinates.file_name("pom"));
    fs::write(&pom_path, pom(&coordinates)).map_err(|e| io_err(&pom_path, e))?;

    Ok(StagedArtifact {
        coordinates,
        files: vec![ir_path, pom_path],
        dir,
    })
}

fn pom(c: &Coordinates) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 http://maven.apache.org/xsd/maven-4.0.0.xsd">
  <modelVersion>4.0.0</modelVersion>
  <groupId>{}</groupId>
  <artifactId>{}</artifactId>
  <version>{}</version>
  <packaging>conjure.json</packaging>
</project>
"#,
        xml_escape(&c.group_id),
        xml_escape(&c.artifact_id),
        xml_escape(&c.version)
    )
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
