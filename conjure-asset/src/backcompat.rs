//! Backcompat asset client.
//!
//! Check exit codes: 0 compatible, 1 incompatible, anything else is an
//! execution failure. Accept treats every non-zero exit as a failure.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::asset::Protocol;
use crate::error::AssetError;
use crate::process::{self, Captured};

/// Inputs for one backcompat invocation.
#[derive(Debug, Clone)]
pub struct BackcompatRequest<'a> {
    pub project: &'a str,
    pub group_id: &'a str,
    pub ir: &'a [u8],
    pub project_dir: &'a Path,
}

/// Result of a backcompat check.
#[derive(Debug)]
pub enum BackcompatOutcome {
    Compatible,
    /// The asset's stdout followed by its stderr, unmodified.
    Incompatible { output: String },
    ExecutionError(AssetError),
}

impl BackcompatOutcome {
    pub fn is_compatible(&self) -> bool {
        matches!(self, BackcompatOutcome::Compatible)
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Check,
    Accept,
}

impl Operation {
    fn json_type(self) -> &'static str {
        match self {
            Operation::Check => "checkBackCompat",
            Operation::Accept => "acceptBackCompatBreaks",
        }
    }

    fn legacy_command(self) -> &'static str {
        match self {
            Operation::Check => "check-backcompat",
            Operation::Accept => "accept-backcompat-breaks",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Operation::Check => "backcompat check",
            Operation::Accept => "accepting backcompat breaks",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackcompatArgs<'a> {
    #[serde(rename = "currentIR")]
    current_ir: &'a Path,
    project: &'a str,
    group_id: &'a str,
    godel_project_dir: &'a Path,
}

/// The single JSON argument of the current protocol. The payload sits under
/// a key named after `type`.
fn json_argument(op: Operation, args: &BackcompatArgs<'_>) -> Result<String, AssetError> {
    let mut envelope = serde_json::Map::new();
    envelope.insert("type".into(), op.json_type().into());
    envelope.insert(op.json_type().into(), serde_json::to_value(args)?);
    Ok(serde_json::Value::Object(envelope).to_string())
}

fn legacy_arguments(op: Operation, args: &BackcompatArgs<'_>) -> Vec<String> {
    vec![
        op.legacy_command().to_string(),
        "--group-id".to_string(),
        args.group_id.to_string(),
        "--project".to_string(),
        args.project.to_string(),
        "--current-ir".to_string(),
        args.current_ir.display().to_string(),
        "--godel-project-dir".to_string(),
        args.godel_project_dir.display().to_string(),
    ]
}

/// A configured backcompat asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackcompatAsset {
    path: PathBuf,
    protocol: Protocol,
}

impl BackcompatAsset {
    pub fn new(path: PathBuf, protocol: Protocol) -> Self {
        Self { path, protocol }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Check `request.ir` against the last accepted state.
    pub fn check(&self, request: &BackcompatRequest<'_>) -> BackcompatOutcome {
        let captured = match self.invoke(Operation::Check, request) {
            Ok(c) => c,
            Err(e) => return BackcompatOutcome::ExecutionError(e),
        };
        match captured.status.code() {
            Some(0) => BackcompatOutcome::Compatible,
            Some(1) => BackcompatOutcome::Incompatible {
                output: format!("{}{}", captured.stdout, captured.stderr),
            },
            _ => BackcompatOutcome::ExecutionError(
                captured.exit_error(&self.path, Operation::Check.label()),
            ),
        }
    }

    /// Record `request.ir` as the accepted state.
    pub fn accept(&self, request: &BackcompatRequest<'_>) -> Result<(), AssetError> {
        let captured = self.invoke(Operation::Accept, request)?;
        if !captured.status.success() {
            return Err(captured.exit_error(&self.path, Operation::Accept.label()));
        }
        Ok(())
    }

    fn invoke(&self, op: Operation, request: &BackcompatRequest<'_>) -> Result<Captured, AssetError> {
        let ir_file = process::ir_tempfile(request.ir)?;
        let args = BackcompatArgs {
            current_ir: ir_file.path(),
            project: request.project,
            group_id: request.group_id,
            godel_project_dir: request.project_dir,
        };
        tracing::debug!(
            "running {} for project '{}' with {}",
            op.label(),
            request.project,
            self.path.display()
        );
        match self.protocol {
            Protocol::Current => process::run(&self.path, [json_argument(op, &args)?]),
            Protocol::Legacy => process::run(&self.path, legacy_arguments(op, &args)),
        }
        // `ir_file` drops here, removing the temp file.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> BackcompatArgs<'static> {
        BackcompatArgs {
            current_ir: Path::new("/tmp/ir.json"),
            project: "api",
            group_id: "com.example",
            godel_project_dir: Path::new("/repo"),
        }
    }

    #[test]
    fn json_argument_shape() {
        let arg = json_argument(Operation::Check, &args()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&arg).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "checkBackCompat",
                "checkBackCompat": {
                    "currentIR": "/tmp/ir.json",
                    "project": "api",
                    "groupId": "com.example",
                    "godelProjectDir": "/repo",
                }
            })
        );

        let arg = json_argument(Operation::Accept, &args()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&arg).unwrap();
        assert_eq!(value["type"], "acceptBackCompatBreaks");
        assert_eq!(value["acceptBackCompatBreaks"]["project"], "api");
    }

    #[test]
    fn legacy_arguments_shape() {
        assert_eq!(
            legacy_arguments(Operation::Accept, &args()),
            vec![
                "accept-backcompat-breaks",
                "--group-id",
                "com.example",
                "--project",
                "api",
                "--current-ir",
                "/tmp/ir.json",
                "--godel-project-dir",
                "/repo",
            ]
        );
    }

    #[test]
    fn spawn_failure_is_an_execution_error() {
        let asset = BackcompatAsset::new(PathBuf::from("/nonexistent/asset"), Protocol::Current);
        let outcome = asset.check(&BackcompatRequest {
            project: "api",
            group_id: "com.example",
            ir: b"{}",
            project_dir: Path::new("/"),
        });
        assert!(matches!(
            outcome,
            BackcompatOutcome::ExecutionError(AssetError::Spawn { .. })
        ));
    }
}
