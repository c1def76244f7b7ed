//! Contract with the external module-bundling engine.
//!
//! The engine is opaque to bale: given an entry file and a [`BundleRequest`] it
//! produces the bundle bytes and may log along the way. Bale only decides which
//! transforms apply and in what order.

mod command;

pub use command::CommandEngine;

use crate::minify::MinifyOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A transform declared by the project, e.g. in `package.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub options: serde_json::Value,
}

impl TransformSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: serde_json::Value::Null,
        }
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }
}

/// One step of a job's per-module transform chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Transform {
    Project(TransformSpec),
    /// Phase-one minification, applied to each module.
    Minify(MinifyOptions),
    /// Coverage instrumentation; always last so minification cannot mangle it.
    Coverage,
}

/// Everything the engine needs to build one bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    pub entry: PathBuf,
    /// Directory module resolution starts from.
    pub base_dir: PathBuf,
    pub transforms: Vec<Transform>,
    /// Emit an inline source map at the end of the bundle.
    pub source_maps: bool,
    /// UMD export name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standalone: Option<String>,
    /// Compile TypeScript before transforms run.
    pub typescript: bool,
    /// The handle will be asked to rebuild; keep caches warm.
    pub watch: bool,
}

/// Bundle bytes and the files that went into them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub code: Vec<u8>,
    /// Files in the dependency graph. Empty when the engine cannot tell.
    pub dependencies: Vec<PathBuf>,
}

impl EngineOutput {
    pub fn new(code: impl Into<Vec<u8>>) -> Self {
        Self {
            code: code.into(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<PathBuf>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

/// Failure reported by the engine or the minifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}{}", .file.as_ref().map(|f| format!(" ({})", f.display())).unwrap_or_default())]
pub struct EngineError {
    pub message: String,
    /// Source file the failure points at, when known.
    pub file: Option<PathBuf>,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
        }
    }

    pub fn in_file(mut self, file: impl AsRef<Path>) -> Self {
        self.file = Some(file.as_ref().to_path_buf());
        self
    }
}

/// Receives engine log lines for the job being built.
pub trait EngineLogger: Send + Sync {
    fn log(&self, message: String);
}

/// A live bundler instance for one job.
///
/// The same handle serves the initial build and every watched rebuild, so an
/// in-process engine can keep its module-resolution cache between calls.
#[async_trait]
pub trait EngineHandle: Send {
    /// Build the bundle. `changed` lists files modified since the previous call and
    /// is empty for the initial build.
    async fn bundle(
        &mut self,
        changed: &[PathBuf],
        logger: &dyn EngineLogger,
    ) -> Result<EngineOutput, EngineError>;
}

/// Factory for engine handles.
pub trait BundleEngine: Send + Sync {
    fn handle(&self, request: BundleRequest) -> Box<dyn EngineHandle>;
}

/// Entry extensions compiled as TypeScript.
pub fn is_typescript(entry: &Path) -> bool {
    matches!(
        entry.extension().and_then(|e| e.to_str()),
        Some("ts" | "tsx" | "mts" | "cts")
    )
}
