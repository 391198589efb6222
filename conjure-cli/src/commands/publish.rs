//! `conjure-plugin publish`: upload IR of publishable projects.

use anyhow::{bail, Context, Result};
use clap::Args;

use conjure_publish::{publish_all, Credentials, MavenPublisher, PublishContext};

use super::{GlobalArgs, Workspace};

/// Arguments for `conjure-plugin publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Base URL of the Maven-layout repository.
    #[arg(long)]
    pub url: String,

    #[arg(long, requires = "password")]
    pub username: Option<String>,

    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Group ID for every published project, overriding config.
    #[arg(long)]
    pub group_id: Option<String>,

    /// Report what would be uploaded without uploading.
    #[arg(long)]
    pub dry_run: bool,
}

impl PublishArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let workspace = Workspace::load(global)?;
        let params = workspace.select(&[])?;

        let credentials = match (self.username, self.password) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (None, None) => None,
            _ => bail!("--username and --password must be given together"),
        };
        let publisher = MavenPublisher::new(self.url, credentials, self.dry_run);
        let ctx = PublishContext {
            project_dir: workspace.project_dir().to_path_buf(),
            config_file: workspace.config_file.clone(),
            group_id_override: self.group_id,
            version: None,
        };

        let published = publish_all(
            &params,
            &ctx,
            &workspace.provider,
            &workspace.assets,
            &publisher,
        )
        .context("publish failed")?;

        if published.is_empty() {
            println!("No projects are marked `publish: true`.");
            return Ok(());
        }
        let prefix = if publisher.is_dry_run() { "[dry-run] " } else { "" };
        for project in &published {
            println!(
                "{prefix}✓ '{}' {}",
                project.project,
                project.coordinates.repository_path()
            );
            for upload in &project.uploads {
                println!("  {} ({} bytes)", upload.url, upload.bytes);
            }
        }
        Ok(())
    }
}
