//! Shared test utilities for bale-bundler tests
//!
//! Provides an in-process engine and minifier so orchestration can be tested without
//! spawning real bundlers.

#![allow(dead_code)]

use async_trait::async_trait;
use bale_bundler::{
    BuildEvent, BundleEngine, BundleRequest, EngineError, EngineHandle, EngineLogger,
    EngineOutput, Minifier, MinifyInput, MinifyOutput, Transform,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// Engine that inlines `require('./x.js');` lines from the entry's directory.
///
/// The bundle starts with a comment listing the applied transforms. Entries containing
/// `SYNTAX ERROR` fail. Inline source maps are appended when requested.
#[derive(Clone, Default)]
pub struct FakeEngine {
    handles: Arc<AtomicUsize>,
    builds: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

impl FakeEngine {
    /// Number of engine handles created so far.
    pub fn handles_created(&self) -> usize {
        self.handles.load(Ordering::SeqCst)
    }

    /// The `changed` list of every build, in call order.
    pub fn builds(&self) -> Vec<Vec<PathBuf>> {
        self.builds.lock().clone()
    }
}

impl BundleEngine for FakeEngine {
    fn handle(&self, request: BundleRequest) -> Box<dyn EngineHandle> {
        self.handles.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeHandle {
            request,
            builds: Arc::clone(&self.builds),
        })
    }
}

struct FakeHandle {
    request: BundleRequest,
    builds: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

#[async_trait]
impl EngineHandle for FakeHandle {
    async fn bundle(
        &mut self,
        changed: &[PathBuf],
        logger: &dyn EngineLogger,
    ) -> Result<EngineOutput, EngineError> {
        self.builds.lock().push(changed.to_vec());

        let entry = &self.request.entry;
        let source = fs::read_to_string(entry)
            .map_err(|e| EngineError::new(e.to_string()).in_file(entry))?;
        if source.contains("SYNTAX ERROR") {
            return Err(EngineError::new("Unexpected token").in_file(entry));
        }

        let transforms: Vec<String> = self
            .request
            .transforms
            .iter()
            .map(|t| match t {
                Transform::Project(spec) => spec.name.clone(),
                Transform::Minify(_) => "minify".to_string(),
                Transform::Coverage => "coverage".to_string(),
            })
            .collect();

        let mut code = format!("/* transforms: {} */\n", transforms.join(","));
        let mut dependencies = vec![entry.clone()];
        let dir = entry.parent().unwrap_or_else(|| Path::new("."));

        for line in source.lines() {
            let required = line
                .strip_prefix("require('./")
                .and_then(|rest| rest.strip_suffix("');"));
            match required {
                Some(name) => {
                    let dep = dir.join(name);
                    let dep_source = fs::read_to_string(&dep)
                        .map_err(|e| EngineError::new(e.to_string()).in_file(&dep))?;
                    code.push_str(&dep_source);
                    dependencies.push(dep);
                }
                None => {
                    code.push_str(line);
                    code.push('\n');
                }
            }
        }

        logger.log(format!("bundled {} modules", dependencies.len()));

        if self.request.source_maps {
            let map = json!({
                "version": 3,
                "sources": dependencies.iter().map(|d| d.display().to_string()).collect::<Vec<_>>(),
                "mappings": "AAAA",
            });
            code.push_str("//# sourceMappingURL=data:application/json;charset=utf-8;base64,");
            code.push_str(&STANDARD.encode(serde_json::to_vec(&map).unwrap()));
            code.push('\n');
        }

        Ok(EngineOutput::new(code).with_dependencies(dependencies))
    }
}

/// Minifier that drops blank lines and indentation and tags the map it returns.
#[derive(Default)]
pub struct FakeMinifier {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Minifier for FakeMinifier {
    async fn minify(&self, input: MinifyInput) -> Result<MinifyOutput, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let code = input
            .code
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("");
        let map = input.map.map(|mut map| {
            map["x_minified"] = json!(true);
            map
        });
        Ok(MinifyOutput { code, map })
    }
}

/// Create a temporary project from `(relative path, content)` pairs.
pub fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().expect("parent")).expect("create dirs");
        fs::write(full, content).expect("write file");
    }
    dir
}

/// Every event received so far, leaving the channel open.
pub fn drain(rx: &mut UnboundedReceiver<BuildEvent>) -> Vec<BuildEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Events other than engine log lines.
pub fn lifecycle(events: Vec<BuildEvent>) -> Vec<BuildEvent> {
    events
        .into_iter()
        .filter(|e| !matches!(e, BuildEvent::Log { .. }))
        .collect()
}

/// Sorted list of files under `dir`, relative to it.
pub fn files_under(dir: &Path) -> Vec<String> {
    let mut found = Vec::new();
    collect_files(dir, dir, &mut found);
    found.sort();
    found
}

fn collect_files(root: &Path, dir: &Path, found: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, found);
        } else if let Ok(rel) = path.strip_prefix(root) {
            found.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}

pub fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("read {}: {}", path.as_ref().display(), e))
}
