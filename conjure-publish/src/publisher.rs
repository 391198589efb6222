//! Artifact repository uploads.

use std::fs;
use std::path::PathBuf;

use base64::Engine;

use crate::error::{io_err, PublishError};
use crate::package::StagedArtifact;

/// Something that can receive staged artifacts.
pub trait Publisher {
    fn publish(&self, artifact: &StagedArtifact) -> Result<Vec<Upload>, PublishError>;
}

/// One file sent (or, in dry-run, that would be sent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub url: String,
    pub file: PathBuf,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    fn header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }
}

/// HTTP PUT to a Maven-layout repository.
#[derive(Debug, Clone)]
pub struct MavenPublisher {
    base_url: String,
    credentials: Option<Credentials>,
    dry_run: bool,
}

impl MavenPublisher {
    pub fn new(base_url: impl Into<String>, credentials: Option<Credentials>, dry_run: bool) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            credentials,
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn url_for(&self, artifact: &StagedArtifact, file_name: &str) -> String {
        format!(
            "{}/{}/{file_name}",
            self.base_url,
            artifact.coordinates.repository_path()
        )
    }

    fn put(&self, url: &str, body: &[u8]) -> Result<(), PublishError> {
        let mut request = ureq::put(url).set("Content-Type", "application/octet-stream");
        if let Some(credentials) = &self.credentials {
            request = request.set("Authorization", &credentials.header());
        }
        request.send_bytes(body).map_err(|e| PublishError::Http {
            url: url.to_string(),
            source: Box::new(e),
        })?;
        Ok(())
    }
}

impl Publisher for MavenPublisher {
    fn publish(&self, artifact: &StagedArtifact) -> Result<Vec<Upload>, PublishError> {
        let mut uploads = Vec::with_capacity(artifact.files.len());
        for file in &artifact.files {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let url = self.url_for(artifact, &file_name);
            let body = fs::read(file).map_err(|e| io_err(file, e))?;

            if self.dry_run {
                tracing::info!("[dry-run] would upload {} ({} bytes)", url, body.len());
            } else {
                self.put(&url, &body)?;
                tracing::info!("uploaded {} ({} bytes)", url, body.len());
            }
            uploads.push(Upload {
                url,
                file: file.clone(),
                bytes: body.len(),
            });
        }
        Ok(uploads)
    }
}
