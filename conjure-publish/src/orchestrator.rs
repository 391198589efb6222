//! Publishing every project marked `publish: true`.
//!
//! ```text
//! for each publishable project (sorted):
//!   IR → static + provider extensions → stage IR + POM → Publisher
//! ```

use std::path::PathBuf;

use conjure_asset::{apply_extensions, Assets, ExtensionsRequest};
use conjure_core::ConjureProjectParam;
use conjure_ir::IrProvider;

use crate::error::PublishError;
use crate::package::{stage, Coordinates};
use crate::publisher::{Publisher, Upload};
use crate::version::project_version;

/// Run-wide inputs for a publish.
#[derive(Debug, Clone)]
pub struct PublishContext {
    pub project_dir: PathBuf,
    pub config_file: PathBuf,
    /// Used instead of each project's configured group ID when set.
    pub group_id_override: Option<String>,
    /// Skips the git lookup when set.
    pub version: Option<String>,
}

/// What was uploaded for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedProject {
    pub project: String,
    pub coordinates: Coordinates,
    pub uploads: Vec<Upload>,
}

/// Publish every project in `params` with `publish` set. Stops at the first
/// failing project.
pub fn publish_all(
    params: &[&ConjureProjectParam],
    ctx: &PublishContext,
    provider: &IrProvider,
    assets: &Assets,
    publisher: &dyn Publisher,
) -> Result<Vec<PublishedProject>, PublishError> {
    let publishable: Vec<&ConjureProjectParam> =
        params.iter().copied().filter(|p| p.publish).collect();
    if publishable.is_empty() {
        tracing::debug!("no publishable projects");
        return Ok(Vec::new());
    }

    let version = match &ctx.version {
        Some(v) => v.clone(),
        None => project_version(&ctx.project_dir)?,
    };

    let mut published = Vec::with_capacity(publishable.len());
    for param in publishable {
        published.push(publish_project(param, &version, ctx, provider, assets, publisher)?);
    }
    Ok(published)
}

fn publish_project(
    param: &ConjureProjectParam,
    version: &str,
    ctx: &PublishContext,
    provider: &IrProvider,
    assets: &Assets,
    publisher: &dyn Publisher,
) -> Result<PublishedProject, PublishError> {
    let group_id = ctx
        .group_id_override
        .as_deref()
        .or(param.group_id.as_deref())
        .ok_or_else(|| PublishError::MissingGroupId {
            project: param.name.to_string(),
        })?;

    let ir = provider.ir_bytes(&param.ir_source)?;
    let request = ExtensionsRequest {
        project: param.name.as_str(),
        group_id: Some(group_id),
        version,
        config_file: &ctx.config_file,
    };
    let ir = apply_extensions(&ir, &param.extensions, assets.extensions_providers(), &request)?;

    let coordinates = Coordinates {
        group_id: group_id.to_string(),
        artifact_id: param.name.to_string(),
        version: version.to_string(),
    };
    let staged = stage(coordinates, &ir)?;
    let uploads = publisher.publish(&staged)?;
    tracing::info!(
        "published '{}' as {}",
        param.name,
        staged.coordinates.repository_path()
    );

    Ok(PublishedProject {
        project: param.name.to_string(),
        coordinates: staged.coordinates.clone(),
        uploads,
    })
}
