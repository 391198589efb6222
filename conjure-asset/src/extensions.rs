//! Extensions providers and merging into IR.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AssetError;
use crate::process;

/// IR field that carries extensions.
pub const EXTENSIONS_FIELD: &str = "extensions";

/// Per-project context handed to every provider.
#[derive(Debug, Clone)]
pub struct ExtensionsRequest<'a> {
    pub project: &'a str,
    pub group_id: Option<&'a str>,
    pub version: &'a str,
    pub config_file: &'a Path,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderArgs<'a> {
    plugin_config_file: &'a Path,
    #[serde(rename = "currentIR")]
    current_ir: &'a Path,
    project_name: &'a str,
    group_id: Option<&'a str>,
    version: &'a str,
}

/// An asset that contributes entries to the IR `extensions` map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionsProvider {
    path: PathBuf,
}

impl ExtensionsProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ask the provider for extensions. Empty stdout or `null` means none.
    pub fn provide(
        &self,
        ir: &[u8],
        request: &ExtensionsRequest<'_>,
    ) -> Result<Map<String, Value>, AssetError> {
        let ir_file = process::ir_tempfile(ir)?;
        let args = ProviderArgs {
            plugin_config_file: request.config_file,
            current_ir: ir_file.path(),
            project_name: request.project,
            group_id: request.group_id,
            version: request.version,
        };
        let captured = process::run(&self.path, [serde_json::to_string(&args)?])?;
        if !captured.status.success() {
            return Err(captured.exit_error(&self.path, "providing extensions"));
        }
        self.parse_output(&captured.stdout)
    }

    fn parse_output(&self, stdout: &str) -> Result<Map<String, Value>, AssetError> {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Ok(Map::new());
        }
        let invalid = |reason: String| AssetError::InvalidOutput {
            asset: self.path.clone(),
            reason,
        };
        match serde_json::from_str(trimmed).map_err(|e| invalid(e.to_string()))? {
            Value::Null => Ok(Map::new()),
            Value::Object(map) => Ok(map),
            other => Err(invalid(format!("expected a JSON object, got {}", kind_of(&other)))),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Merge `additions` into the IR's `extensions` object, later keys winning.
///
/// The IR must be a JSON object whose `extensions` field, if present and
/// non-null, is itself an object. With nothing to add the input bytes are
/// returned as-is.
pub fn merge_extensions(ir: &[u8], additions: &Map<String, Value>) -> Result<Vec<u8>, AssetError> {
    let mut doc: Value = serde_json::from_slice(ir)?;
    let root = doc
        .as_object_mut()
        .ok_or_else(|| AssetError::InvalidIr("IR must be a JSON object".to_string()))?;

    match root.get(EXTENSIONS_FIELD) {
        None | Some(Value::Null) | Some(Value::Object(_)) => {}
        Some(other) => {
            return Err(AssetError::InvalidIr(format!(
                "'{EXTENSIONS_FIELD}' must be a JSON object, got {}",
                kind_of(other)
            )))
        }
    }
    if additions.is_empty() {
        return Ok(ir.to_vec());
    }

    let slot = root
        .entry(EXTENSIONS_FIELD)
        .or_insert_with(|| Value::Object(Map::new()));
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(existing) = slot {
        for (key, value) in additions {
            existing.insert(key.clone(), value.clone());
        }
    }
    Ok(serde_json::to_vec(&doc)?)
}

/// Merge static extensions, then each provider's output in order.
pub fn apply_extensions(
    ir: &[u8],
    static_extensions: &Map<String, Value>,
    providers: &[ExtensionsProvider],
    request: &ExtensionsRequest<'_>,
) -> Result<Vec<u8>, AssetError> {
    let mut current = merge_extensions(ir, static_extensions)?;
    for provider in providers {
        let provided = provider.provide(&current, request)?;
        tracing::debug!(
            "{} provided {} extension(s) for '{}'",
            provider.path().display(),
            provided.len(),
            request.project
        );
        current = merge_extensions(&current, &provided)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    fn merged(ir: Value, additions: Value) -> Result<Value, AssetError> {
        let bytes = merge_extensions(&serde_json::to_vec(&ir).unwrap(), &map(additions))?;
        Ok(serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn creates_extensions_when_absent() {
        assert_eq!(
            merged(json!({"types": []}), json!({"a": 1})).unwrap(),
            json!({"types": [], "extensions": {"a": 1}})
        );
    }

    #[test]
    fn extends_existing_extensions() {
        assert_eq!(
            merged(json!({"extensions": {"a": 1}}), json!({"b": 2})).unwrap(),
            json!({"extensions": {"a": 1, "b": 2}})
        );
    }

    #[test]
    fn later_writer_wins() {
        assert_eq!(
            merged(json!({"extensions": {"a": 1}}), json!({"a": "x"})).unwrap(),
            json!({"extensions": {"a": "x"}})
        );
    }

    #[test]
    fn null_extensions_are_replaced() {
        assert_eq!(
            merged(json!({"extensions": null}), json!({"a": 1})).unwrap(),
            json!({"extensions": {"a": 1}})
        );
    }

    #[test]
    fn array_extensions_are_rejected_even_with_nothing_to_add() {
        for additions in [json!({"a": 1}), json!({})] {
            let err = merged(json!({"extensions": [1, 2]}), additions).unwrap_err();
            assert!(matches!(err, AssetError::InvalidIr(_)), "{err}");
        }
    }

    #[test]
    fn empty_additions_return_input_bytes() {
        let ir = br#"{ "extensions" : {"a":1} }"#;
        assert_eq!(merge_extensions(ir, &Map::new()).unwrap(), ir.to_vec());
    }

    #[test]
    fn non_object_ir_is_rejected() {
        assert!(matches!(
            merge_extensions(b"[]", &Map::new()),
            Err(AssetError::InvalidIr(_))
        ));
    }

    #[test]
    fn provider_output_parsing() {
        let provider = ExtensionsProvider::new(PathBuf::from("/bin/provider"));
        assert!(provider.parse_output("").unwrap().is_empty());
        assert!(provider.parse_output(" null \n").unwrap().is_empty());
        assert_eq!(
            provider.parse_output("{\"k\":true}\n").unwrap(),
            map(json!({"k": true}))
        );
        assert!(matches!(
            provider.parse_output("[1]"),
            Err(AssetError::InvalidOutput { .. })
        ));
        assert!(matches!(
            provider.parse_output("garbage"),
            Err(AssetError::InvalidOutput { .. })
        ));
    }
}
