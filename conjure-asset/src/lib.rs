//! # conjure-asset
//!
//! Clients for external asset executables.
//!
//! Assets announce their kind when queried and are then driven through a
//! fixed subprocess contract: backcompat assets check or accept IR changes,
//! extensions providers return JSON merged into the IR `extensions` field.
//! Load every configured asset once with [`Assets::load`] and pass the
//! result to whatever needs it.

pub mod asset;
pub mod backcompat;
pub mod error;
pub mod extensions;
mod process;

pub use asset::{Asset, AssetKind, Assets, Protocol};
pub use backcompat::{BackcompatAsset, BackcompatOutcome, BackcompatRequest};
pub use error::AssetError;
pub use extensions::{apply_extensions, merge_extensions, ExtensionsProvider, ExtensionsRequest};
