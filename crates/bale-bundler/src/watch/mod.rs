//! Watch mode: keep jobs alive and rebuild them when their sources change.

mod watcher;

pub use watcher::{FileChange, FileWatcher};

use crate::jobs::{Job, Scheduler};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rebuilds jobs whose dependencies change.
///
/// Jobs keep their engine handles from the initial build, so every rebuild reuses the
/// engine's warm caches. The loop has no terminal state of its own; it stops when the
/// watcher channel closes or the caller drops the future.
#[derive(Debug)]
pub struct WatchLoop {
    scheduler: Scheduler,
    jobs: Vec<Job>,
}

impl WatchLoop {
    pub fn new(scheduler: Scheduler, jobs: Vec<Job>) -> Self {
        Self { scheduler, jobs }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Directories to watch, with nested ones folded into their ancestors.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.jobs.iter().flat_map(Job::watch_dirs).collect();
        dirs.sort();
        dirs.dedup();

        let mut roots: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            // Sorted order puts every ancestor before its descendants.
            if !roots.iter().any(|root| dir.starts_with(root)) {
                roots.push(dir);
            }
        }
        roots
    }

    /// Indices of the jobs a change to `path` should rebuild, in job order.
    pub fn affected(&self, path: &Path) -> Vec<usize> {
        // A bundle written by one job must not trigger any other job either.
        if self.jobs.iter().any(|job| job.writes(path)) {
            return Vec::new();
        }
        self.jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| job.depends_on(path))
            .map(|(index, _)| index)
            .collect()
    }

    /// Rebuild every job affected by `path`, one at a time.
    ///
    /// Returns how many jobs were rebuilt. Failures are reported as events and never
    /// stop the loop.
    pub async fn handle_change(&mut self, path: &Path) -> usize {
        let affected = self.affected(path);
        if affected.is_empty() {
            debug!(path = %path.display(), "Change does not affect any bundle");
            return 0;
        }

        info!("{} changed, rebuilding {} bundle(s)", path.display(), affected.len());
        for &index in &affected {
            // The error was already emitted as an event.
            let _ = self.scheduler.rebuild(&mut self.jobs[index], path).await;
        }
        affected.len()
    }

    /// Watch until the watcher stops.
    ///
    /// Directories that show up in a job's dependency graph after a rebuild are added
    /// to the watch set.
    pub async fn run(mut self, ignore_patterns: Vec<String>, debounce_ms: u64) -> Result<()> {
        let roots = self.watch_roots();
        let (mut watcher, mut changes) = FileWatcher::new(roots, ignore_patterns, debounce_ms)?;
        for root in watcher.roots() {
            info!("Watching {}", root.display());
        }

        while let Some(change) = changes.recv().await {
            if self.handle_change(change.path()).await == 0 {
                continue;
            }
            for root in self.watch_roots() {
                if root.exists() && watcher.add_root(root.clone())? {
                    info!("Watching {}", root.display());
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BundleRequest;
    use crate::events::EventSink;
    use crate::{FileSet, Variant};

    struct NoEngine;

    impl crate::BundleEngine for NoEngine {
        fn handle(&self, _: BundleRequest) -> Box<dyn crate::EngineHandle> {
            unreachable!("not built in these tests")
        }
    }

    fn job(entry: &str, output: &str, deps: &[&str]) -> Job {
        let file_set = FileSet::new(entry, output);
        let request = BundleRequest {
            entry: PathBuf::from(entry),
            base_dir: PathBuf::from("/p"),
            transforms: vec![],
            source_maps: false,
            standalone: None,
            typescript: false,
            watch: true,
        };
        let mut job = Job::new(file_set, Variant::Plain, request, None);
        job.dependencies = deps.iter().map(PathBuf::from).collect();
        job
    }

    fn watch_loop(jobs: Vec<Job>) -> WatchLoop {
        WatchLoop::new(
            Scheduler::new(std::sync::Arc::new(NoEngine), EventSink::discard()),
            jobs,
        )
    }

    #[test]
    fn test_roots_fold_nested_dirs() {
        let watch = watch_loop(vec![
            job("/p/src/a.js", "/p/dist/a.js", &[]),
            job("/p/src/lib/b.js", "/p/dist/b.js", &[]),
            job("/p/c.js", "/p/dist/c.js", &["/p/c.js", "/vendor/x/index.js"]),
        ]);

        assert_eq!(
            watch.watch_roots(),
            vec![PathBuf::from("/p"), PathBuf::from("/vendor/x")]
        );
    }

    #[test]
    fn test_affected_in_job_order() {
        let watch = watch_loop(vec![
            job("/p/src/a.js", "/p/dist/a.js", &["/p/src/a.js", "/p/src/shared.js"]),
            job("/p/src/b.js", "/p/dist/b.js", &["/p/src/b.js"]),
            job("/p/src/c.js", "/p/dist/c.js", &["/p/src/c.js", "/p/src/shared.js"]),
        ]);

        assert_eq!(watch.affected(Path::new("/p/src/shared.js")), vec![0, 2]);
        assert_eq!(watch.affected(Path::new("/p/src/b.js")), vec![1]);
        assert!(watch.affected(Path::new("/p/README.md")).is_empty());
    }

    #[test]
    fn test_outputs_never_trigger_rebuilds() {
        let watch = watch_loop(vec![
            job("/p/src/a.js", "/p/src/a.bundle.js", &[]),
            job("/p/src/b.js", "/p/src/b.bundle.js", &[]),
        ]);

        assert!(watch.affected(Path::new("/p/src/a.bundle.js")).is_empty());
        assert_eq!(watch.affected(Path::new("/p/src/util.js")), vec![0, 1]);
    }
}
