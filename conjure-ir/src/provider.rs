//! IR resolution from the three supported sources.
//!
//! | Source    | How the bytes are obtained                                    |
//! |-----------|---------------------------------------------------------------|
//! | `Yaml`    | `<compiler> compile <input> <tmp>/ir.json`, then read `ir.json` |
//! | `IrFile`  | read from disk                                                |
//! | `Remote`  | HTTP GET                                                      |
//!
//! Every source must yield a JSON object; anything else is [`IrError::InvalidIr`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use conjure_core::IrSource;

use crate::error::{io_err, IrError};

/// Compiler used when no override is configured; looked up on `PATH`.
pub const DEFAULT_COMPILER: &str = "conjure";

/// Resolves [`IrSource`]s to IR bytes.
#[derive(Debug, Clone)]
pub struct IrProvider {
    compiler: PathBuf,
}

impl Default for IrProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl IrProvider {
    pub fn new(compiler: Option<PathBuf>) -> Self {
        Self {
            compiler: compiler.unwrap_or_else(|| PathBuf::from(DEFAULT_COMPILER)),
        }
    }

    pub fn compiler(&self) -> &Path {
        &self.compiler
    }

    /// Resolve `source` and check that the result is a JSON object.
    pub fn ir_bytes(&self, source: &IrSource) -> Result<Vec<u8>, IrError> {
        let bytes = match source {
            IrSource::Yaml { path } => self.compile_yaml(path)?,
            IrSource::IrFile { path } => std::fs::read(path).map_err(|e| io_err(path, e))?,
            IrSource::Remote { url } => fetch_remote(url)?,
        };
        validate_ir(&bytes, source)?;
        Ok(bytes)
    }

    fn compile_yaml(&self, input: &Path) -> Result<Vec<u8>, IrError> {
        let staging = tempfile::tempdir().map_err(|e| io_err(std::env::temp_dir(), e))?;
        let output = staging.path().join("ir.json");

        tracing::debug!(
            "compiling {} with {}",
            input.display(),
            self.compiler.display()
        );
        let result = Command::new(&self.compiler)
            .arg("compile")
            .arg(input)
            .arg(&output)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| IrError::Spawn {
                program: self.compiler.clone(),
                source,
            })?;

        if !result.status.success() {
            let mut stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            if stderr.is_empty() {
                stderr = String::from_utf8_lossy(&result.stdout).trim().to_string();
            }
            return Err(IrError::CommandFailed {
                program: self.compiler.clone(),
                status: result.status.to_string(),
                stderr,
            });
        }

        std::fs::read(&output).map_err(|e| io_err(&output, e))
    }
}

fn fetch_remote(url: &str) -> Result<Vec<u8>, IrError> {
    tracing::debug!("fetching IR from {url}");
    let response = ureq::get(url).call().map_err(|e| IrError::Http {
        url: url.to_string(),
        source: Box::new(e),
    })?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| io_err(url, e))?;
    Ok(bytes)
}

fn validate_ir(bytes: &[u8], source: &IrSource) -> Result<(), IrError> {
    let invalid = |reason: String| IrError::InvalidIr {
        origin: source.to_string(),
        reason,
    };
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(serde_json::Value::Object(_)) => Ok(()),
        Ok(_) => Err(invalid("top-level value is not a JSON object".to_string())),
        Err(e) => Err(invalid(e.to_string())),
    }
}
