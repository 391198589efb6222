//! # conjure-ir
//!
//! Resolves conjure IR from its configured source and drives the external
//! code generator that turns IR into an in-memory set of [`OutputFile`]s.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use conjure_ir::{ExternalGenerator, GenerateRequest, Generator, IrProvider};
//! use conjure_core::ConjureProjectParam;
//!
//! fn files_for(param: &ConjureProjectParam) {
//!     let provider = IrProvider::new(None);
//!     let generator = ExternalGenerator::new("conjure-go");
//!     if let Ok(ir) = provider.ir_bytes(&param.ir_source) {
//!         if let Ok(files) = generator.generate(&ir, &GenerateRequest::from_param(param)) {
//!             for file in files {
//!                 println!("{}", file.path().display());
//!             }
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod generator;
pub mod output;
pub mod provider;

pub use error::IrError;
pub use generator::{ExternalGenerator, GenerateRequest, Generator};
pub use output::OutputFile;
pub use provider::IrProvider;
