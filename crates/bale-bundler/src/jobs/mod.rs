//! Jobs: one bundle build per (entry file, variant).
//!
//! - [`build_jobs`] plans the jobs of one entry file.
//! - [`Scheduler`] executes them in order and reports events.
//! - [`PostProcessor`] is the whole-bundle minification pass of the minified variant.

mod builder;
mod post_process;
mod scheduler;

pub use builder::{JobOptions, build_jobs};
pub use post_process::PostProcessor;
pub use scheduler::{RunSummary, Scheduler};

use crate::engine::{BundleRequest, EngineHandle, Transform};
use crate::{FileSet, Variant};
use std::path::{Path, PathBuf};

/// A planned bundle build.
///
/// The engine handle is created on first execution and kept for rebuilds, so a
/// watched job reuses the engine's warm caches.
pub struct Job {
    pub file_set: FileSet,
    pub variant: Variant,
    pub request: BundleRequest,
    pub post_processor: Option<PostProcessor>,
    pub(crate) handle: Option<Box<dyn EngineHandle>>,
    pub(crate) dependencies: Vec<PathBuf>,
}

impl Job {
    pub fn new(
        file_set: FileSet,
        variant: Variant,
        request: BundleRequest,
        post_processor: Option<PostProcessor>,
    ) -> Self {
        Self {
            file_set,
            variant,
            request,
            post_processor,
            handle: None,
            dependencies: Vec::new(),
        }
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.request.transforms
    }

    /// Files the engine reported for the last successful build.
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// Whether a change to `path` should rebuild this job.
    ///
    /// Uses the reported dependency graph, or the entry's directory when the engine
    /// reported none. The job's own artifacts never count.
    pub fn depends_on(&self, path: &Path) -> bool {
        if self.writes(path) {
            return false;
        }
        if self.dependencies.is_empty() {
            return self
                .file_set
                .entry_file
                .parent()
                .is_some_and(|dir| path.starts_with(dir));
        }
        self.dependencies.iter().any(|dep| dep == path)
    }

    /// Whether `path` is this job's bundle or map file.
    pub fn writes(&self, path: &Path) -> bool {
        self.file_set.output_file == path || self.file_set.map_file.as_deref() == Some(path)
    }

    /// Directories whose changes may affect this job.
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = if self.dependencies.is_empty() {
            self.file_set.entry_file.parent().map(Path::to_path_buf).into_iter().collect()
        } else {
            self.dependencies
                .iter()
                .filter_map(|dep| dep.parent().map(Path::to_path_buf))
                .collect()
        };
        dirs.sort();
        dirs.dedup();
        dirs
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("file_set", &self.file_set)
            .field("variant", &self.variant)
            .field("request", &self.request)
            .field("post_processor", &self.post_processor)
            .field("started", &self.handle.is_some())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
