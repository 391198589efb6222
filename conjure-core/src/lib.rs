//! conjure-core: plugin configuration, project parameters and errors.
//!
//! - [`types`]: newtypes and resolved project parameters
//! - [`config`]: versioned YAML loading and validation
//! - [`legacy`]: version 1 schema and its upgrade
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod legacy;
pub mod types;

pub use error::ConfigError;
pub use types::{
    ConjureProjectParam, ConjureProjectParams, GenerationFeatures, IrSource, ProjectName,
    ToolPaths,
};
