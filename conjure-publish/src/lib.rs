//! # conjure-publish
//!
//! Packages the IR of publishable projects, with extensions merged, and
//! uploads it to a Maven-layout artifact repository.

pub mod error;
pub mod orchestrator;
pub mod package;
pub mod publisher;
pub mod version;

pub use error::PublishError;
pub use orchestrator::{publish_all, PublishContext, PublishedProject};
pub use package::{stage, Coordinates, StagedArtifact};
pub use publisher::{Credentials, MavenPublisher, Publisher, Upload};
pub use version::project_version;
