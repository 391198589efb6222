//! Asset discovery.
//!
//! An asset is an executable that tells us what it is when asked:
//!
//! ```text
//! <asset> conjure-plugin-asset-type   → {"type": "backcompat"}            (current)
//! <asset> _assetInfo                  → {"type": "backcompat"}            (legacy)
//! ```
//!
//! The current query is tried first; only if it exits non-zero is the legacy
//! query attempted. Which one answered decides how backcompat operations are
//! invoked later (JSON argument vs. flags).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::backcompat::BackcompatAsset;
use crate::error::AssetError;
use crate::extensions::ExtensionsProvider;
use crate::process;

/// Argument for the current type query.
pub const TYPE_QUERY_ARG: &str = "conjure-plugin-asset-type";
/// Argument for the legacy type query.
pub const LEGACY_INFO_ARG: &str = "_assetInfo";

/// What an asset does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Backcompat,
    ExtensionsProvider,
}

impl AssetKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "backcompat" => Some(AssetKind::Backcompat),
            "conjure-ir-extensions-provider" => Some(AssetKind::ExtensionsProvider),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Backcompat => "backcompat",
            AssetKind::ExtensionsProvider => "conjure-ir-extensions-provider",
        }
    }
}

/// Which discovery query the asset answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Answered `conjure-plugin-asset-type`; takes a single JSON argument.
    Current,
    /// Answered `_assetInfo`; takes subcommand + flags.
    Legacy,
}

/// A discovered asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: PathBuf,
    pub kind: AssetKind,
    pub protocol: Protocol,
}

#[derive(Debug, Deserialize)]
struct TypeResponse {
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl Asset {
    /// Ask the executable at `path` what kind of asset it is.
    pub fn discover(path: &Path) -> Result<Self, AssetError> {
        let current = process::run(path, [TYPE_QUERY_ARG])?;
        let (captured, protocol) = if current.status.success() {
            (current, Protocol::Current)
        } else {
            tracing::debug!(
                "{} did not answer {TYPE_QUERY_ARG}; trying {LEGACY_INFO_ARG}",
                path.display()
            );
            let legacy = process::run(path, [LEGACY_INFO_ARG])?;
            if !legacy.status.success() {
                return Err(legacy.exit_error(path, "type query"));
            }
            (legacy, Protocol::Legacy)
        };

        let kind = parse_type_response(path, &captured.stdout)?;
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            protocol,
        })
    }
}

fn parse_type_response(asset: &Path, stdout: &str) -> Result<AssetKind, AssetError> {
    let invalid = |reason: String| AssetError::InvalidTypeResponse {
        asset: asset.to_path_buf(),
        reason,
    };
    let response: TypeResponse =
        serde_json::from_str(stdout.trim()).map_err(|e| invalid(e.to_string()))?;
    let kind = response
        .kind
        .ok_or_else(|| invalid("missing 'type' field".to_string()))?;
    AssetKind::parse(&kind).ok_or_else(|| AssetError::UnknownType {
        asset: asset.to_path_buf(),
        kind,
    })
}

/// The assets configured for one command invocation.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    backcompat: Option<BackcompatAsset>,
    extensions_providers: Vec<ExtensionsProvider>,
}

impl Assets {
    /// Discover every asset in `paths`. Fails before returning anything if
    /// any asset is unusable or more than one backcompat asset is present.
    pub fn load(paths: &[PathBuf]) -> Result<Self, AssetError> {
        let discovered = paths
            .iter()
            .map(|p| Asset::discover(p))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_assets(discovered)
    }

    /// Sort already-discovered assets by kind, keeping provider order.
    pub fn from_assets(assets: Vec<Asset>) -> Result<Self, AssetError> {
        let mut loaded = Self::default();
        for asset in assets {
            match asset.kind {
                AssetKind::Backcompat => {
                    if let Some(existing) = &loaded.backcompat {
                        return Err(AssetError::MultipleBackcompat {
                            first: existing.path().to_path_buf(),
                            second: asset.path,
                        });
                    }
                    loaded.backcompat = Some(BackcompatAsset::new(asset.path, asset.protocol));
                }
                AssetKind::ExtensionsProvider => {
                    loaded
                        .extensions_providers
                        .push(ExtensionsProvider::new(asset.path));
                }
            }
        }
        Ok(loaded)
    }

    pub fn backcompat(&self) -> Option<&BackcompatAsset> {
        self.backcompat.as_ref()
    }

    pub fn extensions_providers(&self) -> &[ExtensionsProvider] {
        &self.extensions_providers
    }
}
